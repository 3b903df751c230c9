use camahjucunu_decoders::RenderingsPipeline;
use pretty_assertions::assert_eq;

#[test]
fn decodes_screen_panel_figure() {
    let input = "\
SCREEN F+7
  PANEL P1 plot at 0 0 6 4 z 1 scale 1 bind ARG2
    draw CURVE D Y
  ENDPANEL
ENDSCREEN
";
    let pipeline = RenderingsPipeline::new().expect("built-in grammar builds");
    let decoded = pipeline.decode(input).expect("instruction decodes");

    assert_eq!(decoded.screens.len(), 1);
    let screen = &decoded.screens[0];
    assert_eq!(screen.key_raw, "F+7");
    assert_eq!(screen.fcode, 7);
    assert_eq!(screen.panels.len(), 1);

    let panel = &screen.panels[0];
    assert_eq!(panel.kind(), "plot");
    assert_eq!(panel.z_index, 1);
    assert_eq!(panel.scale, 1.0);
    assert_eq!(panel.bind, "ARG2");
    assert_eq!(panel.figures.len(), 1);
    assert_eq!(panel.figures[0].kind(), "CURVE");
}

#[test]
fn properties_commit_to_the_innermost_scope() {
    let input = "\
SCREEN F+7 _screen __name dashboard __border true __back_color #102030
  PANEL P1 plot at 4,2 10,6 z 2 scale 1.5 bind ARG2 __title true \"Market View\"
    draw CURVE D Y
    draw _horizontal_plot __type histogram __capacity 1000 __legend true \"volume\" __line_color #aabbcc
  ENDPANEL
  EVENT _update __name refresh __form field_a:model.path_a,field_b:model.path_b
ENDSCREEN
";
    let pipeline = RenderingsPipeline::new().unwrap();
    let decoded = pipeline.decode(input).unwrap();

    let screen = &decoded.screens[0];
    assert_eq!(screen.kind(), "screen");
    assert_eq!(screen.kind_raw, "_screen");
    assert_eq!(screen.name, "dashboard");
    assert!(screen.border);
    assert_eq!(screen.back_color, "#102030");

    let panel = &screen.panels[0];
    assert_eq!(panel.kind(), "plot");
    assert_eq!(panel.coords.x, 4);
    assert_eq!(panel.coords.y, 2);
    assert_eq!(panel.shape.x, 10);
    assert_eq!(panel.shape.y, 6);
    assert_eq!(panel.z_index, 2);
    assert_eq!(panel.scale, 1.5);
    assert!(panel.title_on);
    assert_eq!(panel.title, "Market View");

    assert_eq!(panel.figures.len(), 2);
    let figure = &panel.figures[1];
    assert_eq!(figure.kind(), "horizontal_plot");
    assert_eq!(figure.type_raw, "histogram");
    assert_eq!(figure.capacity, Some(1000));
    assert!(figure.legend_on);
    assert_eq!(figure.legend, "volume");
    assert_eq!(figure.line_color, "#aabbcc");

    assert_eq!(screen.events.len(), 1);
    let event = &screen.events[0];
    assert_eq!(event.kind_raw, "_update");
    assert_eq!(event.name, "refresh");
    assert_eq!(event.bindings.len(), 2);
    assert_eq!(event.bindings[0].local, "field_a");
    // dots are dropped from form paths; a single leading dot is restored
    assert_eq!(event.bindings[0].path, ".modelpath_a");
    assert_eq!(event.bindings[1].local, "field_b");
    assert_eq!(event.bindings[1].path, ".modelpath_b");
}

#[test]
fn block_comments_are_suppressed() {
    let input = "\
SCREEN F+1
  /* layout notes: id=3 */
  PANEL P2 text at 1,1 2,2
  ENDPANEL
ENDSCREEN
";
    let pipeline = RenderingsPipeline::new().unwrap();
    let decoded = pipeline.decode(input).unwrap();
    let screen = &decoded.screens[0];
    assert_eq!(screen.panels.len(), 1);
    assert_eq!(screen.panels[0].kind(), "text");
    // nothing from the comment leaked into any capture
    assert_eq!(screen.name, "");
}

#[test]
fn panel_without_body_decodes() {
    let input = "\
SCREEN F+2
  PANEL P3 plot
  ENDPANEL
ENDSCREEN
";
    let pipeline = RenderingsPipeline::new().unwrap();
    let decoded = pipeline.decode(input).unwrap();
    assert_eq!(decoded.screens[0].panels.len(), 1);
    assert_eq!(decoded.screens[0].panels[0].kind(), "plot");
    // defaults survive when no attribute is present
    assert_eq!(decoded.screens[0].panels[0].scale, 1.0);
    assert!(!decoded.screens[0].panels[0].coords.set);
}

#[test]
fn string_capture_keeps_last_nonempty_segment_and_escapes() {
    let input = "\
SCREEN F+3
  PANEL P4 text
    draw _label __value \"with \\\"quotes\\\" inside\"
  ENDPANEL
ENDSCREEN
";
    let pipeline = RenderingsPipeline::new().unwrap();
    let decoded = pipeline.decode(input).unwrap();
    let figure = &decoded.screens[0].panels[0].figures[0];
    assert_eq!(figure.kind(), "label");
    assert_eq!(
        figure.value.as_deref(),
        Some("with \"quotes\" inside")
    );
}

#[test]
fn triggers_split_on_commas() {
    let input = "\
SCREEN F+4
  PANEL P5 plot
    draw _buffer __triggers ON_ENTER,ON_CLICK
  ENDPANEL
ENDSCREEN
";
    let pipeline = RenderingsPipeline::new().unwrap();
    let decoded = pipeline.decode(input).unwrap();
    let figure = &decoded.screens[0].panels[0].figures[0];
    assert_eq!(figure.kind_raw, "_buffer");
    assert_eq!(figure.triggers, vec!["ON_ENTER", "ON_CLICK"]);
}

#[test]
fn multiple_screens_decode_in_order() {
    let input = "\
SCREEN F+1
ENDSCREEN
SCREEN F+2
ENDSCREEN
";
    let pipeline = RenderingsPipeline::new().unwrap();
    let decoded = pipeline.decode(input).unwrap();
    assert_eq!(decoded.screens.len(), 2);
    assert_eq!(decoded.screens[0].fcode, 1);
    assert_eq!(decoded.screens[1].fcode, 2);
}

#[test]
fn display_summarizes_the_layout() {
    let input = "\
SCREEN F+7
  PANEL P1 plot
    draw CURVE D Y
  ENDPANEL
ENDSCREEN
";
    let pipeline = RenderingsPipeline::new().unwrap();
    let decoded = pipeline.decode(input).unwrap();
    let rendered = decoded.to_string();
    assert!(rendered.contains("screens: 1"));
    assert!(rendered.contains("SCREEN"));
    assert!(rendered.contains("PANEL plot"));
    assert!(rendered.contains("FIGURE CURVE"));
}

#[test]
fn garbage_is_a_parse_error() {
    let pipeline = RenderingsPipeline::new().unwrap();
    assert!(pipeline.decode("DRAWER X1\n").is_err());
}
