use scrollweave::{
    ElementId, HorizontalSpec, PropertyStore, Rect, SectionDef, Stage, StageConfig, StaticLayout,
    Viewport,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut layout = StaticLayout::new(Viewport::new(1280.0, 800.0)?);
    layout
        .insert(ElementId(20), Rect::new(0.0, 1200.0, 1280.0, 2000.0))
        .insert(ElementId(40), Rect::new(0.0, 2400.0, 1280.0, 3200.0))
        .insert(ElementId(41), Rect::new(0.0, 2400.0, 3840.0, 3200.0));
    layout.set_document_height(4400.0);

    let mut stage = Stage::new(StageConfig::default(), layout)?;
    let sections: Vec<SectionDef> = serde_json::from_str(include_str!("../tests/data/story.json"))?;
    for def in &sections {
        stage.mount(def)?;
    }
    stage.mount_with("gallery", |ctx, reg, layout| {
        ctx.add_horizontal(
            reg,
            layout,
            HorizontalSpec {
                section: ElementId(40),
                strip: ElementId(41),
                slides: vec![ElementId(42), ElementId(43), ElementId(44)],
            },
        )
        .map(|_| ())
    })?;

    let mut store = PropertyStore::new();
    for f in 0..240u32 {
        if f % 20 == 0 {
            stage.scroll_mut().on_wheel(600.0);
        }
        let report = stage.frame(1.0 / 60.0, &mut store);
        if f % 30 == 0 || !report.events.is_empty() {
            println!(
                "frame={} pos={:.1} events={} about.y={:?} strip.x={:?}",
                report.frame,
                report.position,
                report.events.len(),
                store.scalar(ElementId(21), "y"),
                store.scalar(ElementId(41), "x"),
            );
        }
    }
    Ok(())
}
