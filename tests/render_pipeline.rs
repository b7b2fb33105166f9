mod support;

use planviz::config::Config;
use planviz::model::{Project, TaskStatus};
use planviz::report::{compose_project, Primitive};
use planviz::svg::SvgRenderer;

#[test]
fn full_pipeline_renders_fixture_project() {
    let project = support::fixture_project();
    let config = Config::default();

    let plan = compose_project(&project, &config.report);
    assert_eq!(plan.panels.len(), 4);
    assert_eq!(plan.title.as_deref(), Some("Project: Fixture Sprint"));

    let gantt = &plan.panels[0];
    let bars = gantt
        .primitives
        .iter()
        .filter(|primitive| matches!(primitive, Primitive::Bar { .. }))
        .count();
    assert_eq!(bars, 3);
    assert!(gantt.primitives.iter().any(
        |primitive| matches!(primitive, Primitive::Arrow { color, dashed, .. } if color == "red" && *dashed)
    ));

    let svg = SvgRenderer::new().render(&plan);
    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>\n") || svg.ends_with("</svg>"));
    assert!(svg.contains("#2196F3"));
    assert!(svg.contains("#4CAF50"));
    assert!(svg.contains("marker-end"));
}

#[test]
fn unknown_status_degrades_to_neutral_color() {
    let mut project = support::fixture_project();
    project.tasks[0].status = TaskStatus::Other("On Hold".to_string());
    let config = Config::default();

    let plan = compose_project(&project, &config.report);
    let gantt = &plan.panels[0];
    assert!(gantt.primitives.iter().any(
        |primitive| matches!(primitive, Primitive::Bar { color, .. } if color == "#CCCCCC")
    ));

    let svg = SvgRenderer::new().render(&plan);
    assert!(svg.contains("#CCCCCC"));
    assert!(svg.contains("On Hold"));
}

#[test]
fn empty_project_renders_placeholders() {
    let project = Project::new("Empty");
    let config = Config::default();

    let plan = compose_project(&project, &config.report);
    assert_eq!(plan.panels.len(), 4);
    for panel in &plan.panels {
        assert!(panel
            .primitives
            .iter()
            .all(|primitive| matches!(primitive, Primitive::Placeholder { .. })));
    }

    let svg = SvgRenderer::new().render(&plan);
    assert!(svg.contains("No tasks available"));
    assert!(svg.contains("No mails available"));
    assert!(!svg.contains("No task dependencies"));
    assert!(svg.contains("Gantt Chart - Tasks Timeline"));
    assert!(!svg.contains("(with dependencies)"));
}

#[test]
fn text_is_escaped_end_to_end() {
    let mut project = support::fixture_project();
    project.title = "R&D <Phase 1>".to_string();
    project.tasks[0].name = "Design & \"review\"".to_string();
    let config = Config::default();

    let plan = compose_project(&project, &config.report);
    let svg = SvgRenderer::new().render(&plan);
    assert!(svg.contains("R&amp;D &lt;Phase 1&gt;"));
    assert!(svg.contains("Design &amp; &quot;review&quot;"));
    assert!(!svg.contains("<Phase 1>"));
}
