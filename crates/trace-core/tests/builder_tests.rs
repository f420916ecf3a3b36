//! Tests for trace tree reconstruction

use std::sync::Barrier;

use pretty_assertions::assert_eq;
use xslt_trace_core::{
    build_tree, render, render_tree, BuilderState, CanonicalEvent, DetailLevel, Error, EventSink,
    Level, Location, OutputEvent, OutputEventKind, SharedTraceBuilder, Tag, TraceTree,
    TraceTreeBuilder, SEPARATOR,
};

const SHEET: &str = "file:///work/styles/main.xsl";

fn template(pattern: &str, line: u32) -> CanonicalEvent {
    CanonicalEvent::enter(Tag::TemplateMatch, Level::Rule, Location::new(SHEET, line, 5))
        .with_match(pattern)
}

fn literal(name: &str, line: u32) -> CanonicalEvent {
    CanonicalEvent::enter(
        Tag::LiteralElement,
        Level::Expression,
        Location::new(SHEET, line, 7),
    )
    .with_attribute("name", name)
}

fn instruction(name: &str, line: u32) -> CanonicalEvent {
    CanonicalEvent::enter(Tag::Misc, Level::Instruction, Location::new(SHEET, line, 9))
        .with_name(name)
}

fn leave() -> CanonicalEvent {
    CanonicalEvent::leave(Level::Instruction)
}

fn template_with_literal() -> Vec<CanonicalEvent> {
    vec![template("/", 3), literal("out", 4), leave(), leave()]
}

// ====== Nesting and truncation ======

#[test]
fn test_template_with_literal_element_nests() {
    let tree = build_tree(DetailLevel::High, template_with_literal()).unwrap();

    assert!(!tree.is_truncated());
    assert_eq!(tree.top_level().len(), 1);
    let template = &tree.top_level()[0];
    assert_eq!(template.tag(), Tag::TemplateMatch);
    assert_eq!(template.match_expression(), Some("/"));
    assert_eq!(template.children().len(), 1);
    assert_eq!(template.children()[0].tag(), Tag::LiteralElement);
    assert_eq!(template.children()[0].match_expression(), None);

    let expected = "<xsl:template match=\"/\" line=\"3\" column=\"5\" module=\"main.xsl\">\n  <LRE name=\"out\" line=\"4\" column=\"7\" module=\"main.xsl\">\n";
    assert_eq!(render(template, false), expected);
    assert_eq!(
        render_tree(&tree, true),
        format!("{}{}\n", SEPARATOR, expected)
    );
}

#[test]
fn test_low_detail_drops_expression_enter_and_its_leave() {
    let tree = build_tree(DetailLevel::Low, template_with_literal()).unwrap();

    assert!(!tree.is_truncated());
    assert_eq!(tree.node_count(), 1);
    let template = &tree.top_level()[0];
    assert_eq!(template.match_expression(), Some("/"));
    assert!(template.is_leaf());
}

#[test]
fn test_missing_leave_truncates() {
    let tree = build_tree(DetailLevel::High, vec![template("/", 3)]).unwrap();

    assert!(tree.is_truncated());
    assert_eq!(tree.top_level().len(), 1);
    assert!(render_tree(&tree, false).ends_with("<!-- trace truncated -->\n"));
}

#[test]
fn test_open_frames_force_close_innermost_first() {
    let events = vec![
        template("/", 1),
        literal("out", 2),
        instruction("xsl:apply-templates", 3),
        template("item", 4),
    ];
    let tree = build_tree(DetailLevel::Normal, events).unwrap();

    assert!(tree.is_truncated());
    assert_eq!(tree.top_level().len(), 1);
    let root = &tree.top_level()[0];
    assert_eq!(root.match_expression(), Some("/"));
    assert_eq!(root.depth(), 1);
    assert_eq!(root.children().len(), 1);

    let apply = &root.children()[0];
    assert_eq!(apply.element_name(), "xsl:apply-templates");
    assert_eq!(apply.depth(), 2);
    assert_eq!(apply.children().len(), 1);

    let item = &apply.children()[0];
    assert_eq!(item.match_expression(), Some("item"));
    assert_eq!(item.depth(), 3);
    assert!(item.is_leaf());
    assert_eq!(tree.node_count(), 3);
}

fn drive(barrier: &Barrier, pattern: &str, inner: &str) -> TraceTree {
    let mut builder = TraceTreeBuilder::new(DetailLevel::High);
    builder.open().unwrap();
    let events = vec![
        template(pattern, 1),
        instruction(inner, 2),
        leave(),
        template(pattern, 3),
        leave(),
        leave(),
    ];
    for event in events {
        barrier.wait();
        builder.accept(event).unwrap();
    }
    builder.finish()
}

#[test]
fn test_concurrent_contexts_stay_separate() {
    let barrier = Barrier::new(2);

    let (left, right) = std::thread::scope(|scope| {
        let left = scope.spawn(|| drive(&barrier, "left", "xsl:value-of"));
        let right = scope.spawn(|| drive(&barrier, "right", "xsl:copy-of"));
        (left.join().unwrap(), right.join().unwrap())
    });

    for (tree, pattern, inner) in [
        (&left, "left", "xsl:value-of"),
        (&right, "right", "xsl:copy-of"),
    ] {
        assert!(!tree.is_truncated());
        assert_eq!(tree.node_count(), 3);
        let top = &tree.top_level()[0];
        assert_eq!(top.match_expression(), Some(pattern));
        assert_eq!(top.children()[0].element_name(), inner);
        assert_eq!(top.children()[1].match_expression(), Some(pattern));
    }
}

// ====== Structural properties ======

#[test]
fn test_children_keep_enter_order() {
    let events = vec![
        template("/", 1),
        instruction("xsl:variable", 2),
        leave(),
        instruction("xsl:value-of", 3),
        leave(),
        literal("out", 4),
        leave(),
        leave(),
    ];
    let tree = build_tree(DetailLevel::High, events).unwrap();
    let names: Vec<_> = tree.top_level()[0]
        .children()
        .iter()
        .map(|c| c.element_name())
        .collect();
    assert_eq!(names, vec!["xsl:variable", "xsl:value-of", "LRE"]);
}

#[test]
fn test_raising_detail_never_removes_nodes() {
    let events = vec![
        template("/", 1),
        instruction("xsl:apply-templates", 2),
        template("item", 3),
        literal("row", 4),
        instruction("xsl:value-of", 5),
        leave(),
        leave(),
        leave(),
        leave(),
        leave(),
    ];
    let levels = [
        DetailLevel::None,
        DetailLevel::Low,
        DetailLevel::Normal,
        DetailLevel::High,
    ];
    let retained: Vec<Vec<u32>> = levels
        .iter()
        .map(|level| {
            let tree = build_tree(*level, events.clone()).unwrap();
            assert!(!tree.is_truncated());
            tree.nodes().map(|n| n.location().line).collect()
        })
        .collect();

    assert_eq!(retained[0], Vec::<u32>::new());
    assert_eq!(retained[1], vec![1, 3]);
    assert_eq!(retained[2], vec![1, 2, 3, 5]);
    assert_eq!(retained[3], vec![1, 2, 3, 4, 5]);
    for pair in retained.windows(2) {
        assert!(pair[0].iter().all(|line| pair[1].contains(line)));
    }
}

#[test]
fn test_filtered_parent_reparents_children_to_nearest_kept_node() {
    let events = vec![
        template("/", 1),
        literal("out", 2),
        instruction("xsl:apply-templates", 3),
        leave(),
        leave(),
        leave(),
    ];
    let tree = build_tree(DetailLevel::Normal, events).unwrap();
    let template = &tree.top_level()[0];
    assert_eq!(template.children().len(), 1);
    assert_eq!(template.children()[0].depth(), 2);
    assert_eq!(
        render(template, false),
        "<xsl:template match=\"/\" line=\"1\" column=\"5\" module=\"main.xsl\">\n  <xsl:apply-templates line=\"3\" column=\"9\" module=\"main.xsl\">\n"
    );
}

#[test]
fn test_render_is_idempotent() {
    let tree = build_tree(DetailLevel::High, template_with_literal()).unwrap();
    let node = &tree.top_level()[0];
    let first = render(node, true);
    for _ in 0..3 {
        assert_eq!(render(node, true), first);
    }
    assert_eq!(render_tree(&tree, true), render_tree(&tree, true));
}

#[test]
fn test_unmatched_leave_marks_truncated() {
    let tree = build_tree(DetailLevel::High, vec![template("/", 1), leave(), leave()]).unwrap();
    assert!(tree.is_truncated());
    assert_eq!(tree.node_count(), 1);
}

// ====== Selections and output ======

#[test]
fn test_selection_annotates_only_the_open_node() {
    let events = vec![
        template("/", 1),
        instruction("xsl:apply-templates", 2),
        CanonicalEvent::selection("item", Location::new("input.xml", 4, 3)),
        CanonicalEvent::selection_end(),
        leave(),
        instruction("xsl:value-of", 3),
        leave(),
        leave(),
    ];
    let tree = build_tree(DetailLevel::High, events).unwrap();
    let template = &tree.top_level()[0];
    assert_eq!(template.selected_node(), None);
    assert_eq!(template.children()[0].selected_node(), Some("item"));
    assert_eq!(template.children()[1].selected_node(), None);
    assert!(render(template, false)
        .contains("  <xsl:apply-templates line=\"2\" column=\"9\" module=\"main.xsl\">\n    <selected node=\"item\"/>\n"));
}

#[test]
fn test_selection_without_open_node_is_ignored() {
    let events = vec![
        CanonicalEvent::selection("early", Location::unknown()),
        template("/", 1),
        leave(),
    ];
    let tree = build_tree(DetailLevel::High, events).unwrap();
    assert_eq!(tree.root().selected_node(), None);
    assert_eq!(tree.top_level()[0].selected_node(), None);
}

#[test]
fn test_generated_output_is_attached_to_open_node() {
    let events = vec![
        template("/", 1),
        CanonicalEvent::generated(
            OutputEvent::new(OutputEventKind::StartElement).with_name("out"),
        ),
        CanonicalEvent::generated(
            OutputEvent::new(OutputEventKind::Characters).with_text("a < b\n"),
        ),
        leave(),
    ];
    let tree = build_tree(DetailLevel::High, events.clone()).unwrap();
    assert_eq!(
        tree.top_level()[0].raw_text(),
        "<xsl:template match=\"/\" line=\"1\" column=\"5\" module=\"main.xsl\">\n  <output event=\"start-element\" name=\"out\"/>\n  <output event=\"characters\" text=\"a &lt; b&#xA;\"/>\n"
    );

    let filtered = build_tree(DetailLevel::Normal, events).unwrap();
    assert!(!filtered.top_level()[0].raw_text().contains("<output"));
}

// ====== Escaping and locations ======

#[test]
fn test_expression_text_is_collapsed_and_escaped() {
    let event = CanonicalEvent::enter(Tag::TemplateMatch, Level::Rule, Location::new(SHEET, 1, 1))
        .with_match("item[@kind = \"a&b\"]\n\t| other");
    let tree = build_tree(DetailLevel::High, vec![event, leave()]).unwrap();
    assert_eq!(
        tree.top_level()[0].raw_text(),
        "<xsl:template match=\"item[@kind = &#34;a&amp;b&#34;] | other\" line=\"1\" column=\"1\" module=\"main.xsl\">\n"
    );
}

#[test]
fn test_unknown_location_and_built_in_flag() {
    let event = CanonicalEvent::enter(Tag::TemplateMatch, Level::Rule, Location::unknown())
        .with_match("*")
        .with_built_in(true);
    let tree = build_tree(DetailLevel::High, vec![event, leave()]).unwrap();
    let node = &tree.top_level()[0];
    assert!(node.is_built_in());
    assert_eq!(
        node.raw_text(),
        "<xsl:template match=\"*\" built-in=\"true\" location=\"unknown\">\n"
    );
}

#[test]
fn test_named_template_renders_name_attribute() {
    let event =
        CanonicalEvent::enter(Tag::NamedTemplate, Level::Rule, Location::new(SHEET, 8, -1))
            .with_match("helper");
    let tree = build_tree(DetailLevel::High, vec![event, leave()]).unwrap();
    assert_eq!(
        tree.top_level()[0].raw_text(),
        "<xsl:template name=\"helper\" line=\"8\" module=\"main.xsl\">\n"
    );
}

#[test]
fn test_engine_names_and_attribute_keys_are_escaped() {
    let event = CanonicalEvent::enter(Tag::Misc, Level::Instruction, Location::new(SHEET, 2, 1))
        .with_name("ext:\"odd\"<op>")
        .with_attribute("a<b", "v");
    let tree = build_tree(DetailLevel::High, vec![event, leave()]).unwrap();
    assert_eq!(
        tree.top_level()[0].raw_text(),
        "<ext:&#34;odd&#34;&lt;op&gt; a&lt;b=\"v\" line=\"2\" column=\"1\" module=\"main.xsl\">\n"
    );
}

// ====== Lifecycle ======

#[test]
fn test_lifecycle_states() {
    let mut builder = TraceTreeBuilder::new(DetailLevel::High);
    assert_eq!(builder.state(), BuilderState::Idle);
    builder.open().unwrap();
    builder.open().unwrap();
    assert_eq!(builder.state(), BuilderState::Open);

    builder.accept(template("/", 1)).unwrap();
    assert_eq!(builder.context().map(|c| c.frame_depth()), Some(1));
    builder.accept(CanonicalEvent::document_leave()).unwrap();
    assert_eq!(builder.state(), BuilderState::Closed);
    assert!(builder.tree().is_some_and(|t| t.is_truncated()));

    assert!(matches!(
        builder.accept(template("/", 2)),
        Err(Error::ContextClosed)
    ));
    assert!(matches!(builder.open(), Err(Error::ContextClosed)));

    let first = builder.close().clone();
    assert_eq!(builder.close(), &first);
}

#[test]
fn test_events_before_open_open_implicitly() {
    let mut builder = TraceTreeBuilder::new(DetailLevel::High);
    builder.accept(template("/", 1)).unwrap();
    assert_eq!(builder.state(), BuilderState::Open);
    builder.accept(leave()).unwrap();
    let tree = builder.finish();
    assert_eq!(tree.node_count(), 1);
    assert!(!tree.is_truncated());
}

#[test]
fn test_document_enter_keeps_engine_attributes() {
    let events = vec![
        CanonicalEvent::document_enter().with_attribute("saxon-version", "12.4"),
        template("/", 1),
        leave(),
        CanonicalEvent::document_leave(),
    ];
    let tree = build_tree(DetailLevel::High, events).unwrap();
    assert_eq!(
        tree.engine_attributes(),
        &[("saxon-version".to_string(), "12.4".to_string())]
    );
}

#[test]
fn test_node_ids_are_unique() {
    let events = vec![
        template("/", 1),
        instruction("xsl:value-of", 2),
        leave(),
        instruction("xsl:value-of", 3),
        leave(),
        leave(),
    ];
    let tree = build_tree(DetailLevel::High, events).unwrap();
    let mut ids: Vec<_> = tree.nodes().map(|n| n.id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_shared_builder_serializes_intake() {
    let shared = SharedTraceBuilder::new(DetailLevel::High);
    shared.open().unwrap();

    std::thread::scope(|scope| {
        for _ in 0..2 {
            let mut sink = shared.clone();
            scope.spawn(move || {
                for i in 0..50 {
                    let output = OutputEvent::new(OutputEventKind::Characters)
                        .with_text(format!("chunk {}", i));
                    sink.accept(CanonicalEvent::generated(output)).unwrap();
                }
            });
        }
    });

    let tree = shared.close();
    assert_eq!(shared.state(), BuilderState::Closed);
    assert_eq!(tree.root().raw_text().matches("<output ").count(), 100);
}
