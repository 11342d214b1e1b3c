use proposify_core::branding::{BrandingParams, LogoLayout, LogoPosition};
use proposify_core::editor::{self, EditorState, MAX_HISTORY};
use proposify_core::render::{generate_proposal_html, render_logo_block, render_title};
use proposify_core::serializer::{self, from_json, to_html, to_json, to_plain_text};
use proposify_core::types::{
    Block, BlockContent, CtaContent, ImageContent, PricingContent, PricingItem, Proposal,
    SectionDocument, SectionKind, TextContent, VideoContent,
};
use proposify_core::validation::{can_send_proposal, sanitize_content, validate_block};

fn text(html: &str) -> BlockContent {
    BlockContent::Text(TextContent { html: html.into() })
}

fn pricing(items: Vec<PricingItem>) -> BlockContent {
    BlockContent::Pricing(PricingContent { items, title: Some("Investment".into()) })
}

fn sample_blocks() -> Vec<Block> {
    vec![
        Block::with_id("b1", text("<p>Hello</p>"), 0),
        Block::with_id(
            "b2",
            BlockContent::Image(ImageContent {
                url: "https://cdn.example.com/hero.png".into(),
                alt: Some("Hero".into()),
                caption: None,
            }),
            1,
        ),
        Block::with_id("b3", pricing(vec![PricingItem::new("Design", 1.0, 4500.0)]), 2),
        Block::with_id(
            "b4",
            BlockContent::Cta(CtaContent {
                title: "Ready?".into(),
                button_text: "Accept".into(),
                description: Some("Sign today".into()),
                button_url: Some("https://example.com/accept".into()),
            }),
            3,
        ),
    ]
}

#[test]
fn json_round_trip_preserves_blocks() {
    let blocks = sample_blocks();
    let json = to_json(&blocks).expect("blocks should serialize");
    assert_eq!(from_json(&json).expect("json should parse"), blocks);
}

#[test]
fn persisted_json_uses_wire_shape() {
    let json = r#"[
      {"id":"b1","type":"cta","content":{"title":"Go","buttonText":"Start","buttonUrl":"https://x.io"},"position":0},
      {"id":"b2","type":"chart","content":{"series":[1,2,3]},"position":1}
    ]"#;
    let blocks = from_json(json).expect("json should parse");
    assert_eq!(blocks.len(), 2);
    assert!(matches!(&blocks[0].content, BlockContent::Cta(cta) if cta.button_text == "Start"));
    assert!(matches!(&blocks[1].content, BlockContent::Unknown { kind, .. } if kind == "chart"));

    let reparsed = from_json(&to_json(&blocks).expect("blocks should serialize")).unwrap();
    assert_eq!(reparsed, blocks);
}

#[test]
fn content_of_the_wrong_shape_is_a_parse_failure() {
    let json = r#"[{"id":"b1","type":"pricing","content":{"items":"oops"},"position":0}]"#;
    let failure = from_json(json).unwrap_err();
    assert!(failure.reason.contains("pricing"), "{}", failure.reason);
    assert!(serializer::from_json_or_empty(json).is_empty());
}

#[test]
fn editor_keeps_positions_dense() {
    let mut state = editor::load_proposal(EditorState::new(), Proposal::new("Proposal"));
    for html in ["a", "b", "c", "d"] {
        state = editor::add_block(state, text(html));
    }
    let second = state.blocks()[1].id.clone();
    let last = state.blocks()[3].id.clone();

    state = editor::duplicate_block(state, &second);
    state = editor::delete_block(state, &last);
    let mut reversed = state.blocks().to_vec();
    reversed.reverse();
    state = editor::reorder_blocks(state, reversed);

    let positions: Vec<usize> = state.blocks().iter().map(|block| block.position).collect();
    assert_eq!(positions, (0..state.blocks().len()).collect::<Vec<_>>());
}

#[test]
fn history_is_capped_and_keeps_newest_states() {
    let mut state = editor::load_proposal(EditorState::new(), Proposal::new("Proposal"));
    for i in 0..75 {
        state = editor::add_block(state, text(&format!("{i}")));
    }
    assert_eq!(state.history.len(), MAX_HISTORY);
    assert_eq!(state.history.entries().last().unwrap().blocks.len(), 75);
    assert_eq!(state.history.entries()[0].blocks.len(), 75 - MAX_HISTORY + 1);
}

#[test]
fn pricing_validation_reports_every_field() {
    let block = Block::with_id("p", pricing(vec![PricingItem::new("", -1.0, -5.0)]), 0);
    let errors = validate_block(&block);
    let fields: Vec<&str> = errors.iter().map(|error| error.field.as_str()).collect();
    assert!(errors.len() >= 3);
    assert!(fields.contains(&"items[0].name"));
    assert!(fields.contains(&"items[0].quantity"));
    assert!(fields.contains(&"items[0].price"));
}

#[test]
fn pricing_total_is_rounded_once_in_both_outputs() {
    let blocks = vec![Block::with_id("p", pricing(vec![PricingItem::new("A", 2.0, 10.005)]), 0)];
    assert!(to_html(&blocks).contains("$20.01"));
    assert!(to_plain_text(&blocks).contains("Total: $20.01"));
}

#[test]
fn missing_timeline_produces_no_timeline_heading() {
    let doc = SectionDocument::new("Plan", "Acme")
        .with_section(SectionKind::ExecutiveSummary, "<p>Summary</p>")
        .with_section(SectionKind::Terms, "<p>Terms</p>");
    let html = generate_proposal_html(&doc, &BrandingParams::default());
    assert!(!html.contains("Project Timeline"));
    assert!(!html.contains("Development Timeline"));
}

#[test]
fn youtube_links_embed_as_iframes() {
    let blocks = vec![Block::with_id(
        "v",
        BlockContent::Video(VideoContent {
            url: "https://www.youtube.com/watch?v=abc123".into(),
            caption: None,
        }),
        0,
    )];
    let html = to_html(&blocks);
    assert!(html.contains("<iframe src=\"https://www.youtube.com/embed/abc123\""));
    assert!(!html.contains("<video"));
}

#[test]
fn send_gate_checks_title_and_blocks() {
    let empty = can_send_proposal("", &[]);
    assert!(!empty.is_valid);
    assert!(empty.errors.iter().any(|error| error.field == "title"));

    let ready = can_send_proposal("Valid Title", &[Block::with_id("b1", text("hi"), 0)]);
    assert!(ready.is_valid);
    assert!(ready.errors.is_empty());
}

#[test]
fn sanitizing_an_image_strips_javascript_urls() {
    let content = BlockContent::Image(ImageContent {
        url: "javascript:alert(1)".into(),
        ..ImageContent::default()
    });
    let BlockContent::Image(image) = sanitize_content(&content) else {
        panic!("sanitizing keeps the block type");
    };
    assert!(!image.url.to_lowercase().contains("javascript:"));
}

#[test]
fn sanitizing_rich_text_drops_scripts_and_handlers() {
    let content = text("<p onclick=\"steal()\">Hi<script>alert(1)</script></p>");
    let BlockContent::Text(clean) = sanitize_content(&content) else {
        panic!("sanitizing keeps the block type");
    };
    assert!(!clean.html.contains("<script"));
    assert!(!clean.html.contains("onclick"));
    assert!(clean.html.contains("Hi"));
}

#[test]
fn next_to_title_moves_logos_into_the_heading_row() {
    let branding = BrandingParams {
        logo_position: LogoPosition::NextToTitle,
        logo_layout: LogoLayout::Stacked,
        company_logo: Some("data:image/png;base64,AAA".into()),
        client_logo: Some("data:image/png;base64,BBB".into()),
        ..BrandingParams::default()
    };
    assert_eq!(render_logo_block(&branding), "");
    let title = render_title("Plan", &branding);
    assert_eq!(title.matches("<img").count(), 2);
    assert!(title.find("AAA").unwrap() < title.find("<h1>").unwrap());
    assert!(title.find("</h1>").unwrap() < title.find("BBB").unwrap());
}

#[test]
fn cta_scenario_serializes_exactly() {
    let blocks = vec![Block::with_id(
        "b1",
        BlockContent::Cta(CtaContent {
            title: "Let's go".into(),
            button_text: "Sign Up".into(),
            ..CtaContent::default()
        }),
        0,
    )];
    assert_eq!(to_plain_text(&blocks), "Let's go\n\nSign Up: ");
    let html = to_html(&blocks);
    assert!(html.contains("href=\"#\""));
    assert!(html.contains(">Sign Up</a>"));
}
