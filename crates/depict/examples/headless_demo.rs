use std::cell::Cell;
use std::rc::Rc;

use depict::math::{rect_path, Rect};
use depict::{
    BoundingBoxProps, CanvasEvent, DrawCommand, Graph, GraphConfig, Mesh, MeshOptions,
    RecordingSurface, ShadowElement, SurfaceBox, Text, TextOptions,
};
use glam::Vec2;

fn main() {
    tracing_subscriber::fmt::init();
    println!("=== Depict Headless Demo ===");

    // 1. Initialize Graph with a base layer and an overlay
    let mut graph = Graph::new(GraphConfig::default());
    let base = RecordingSurface::new(0, 0);
    let overlay = RecordingSurface::new(0, 0);
    let logs = [base.log(), overlay.log()];
    let surfaces: Vec<SurfaceBox> = vec![Box::new(base), Box::new(overlay)];
    graph.initialize(surfaces, 640.0, 480.0, 2.0, None);

    // 2. Build a button with a label and a tooltip that floats on the overlay
    let hovered = Rc::new(Cell::new(false));
    let clicks = Rc::new(Cell::new(0u32));

    let label = Text::new("Press me").with_offset(10.0, 24.0);
    let label_box = graph.bounding_box(&label, BoundingBoxProps::default());
    println!("Label measures {} x {}", label_box.width, label_box.height);

    let tooltip = ShadowElement::new(0.0, -30.0)
        .layer_up(true)
        .with_shape(Mesh::new(rect_path(120.0, 24.0)).with_options(MeshOptions {
            background: Some(true),
            ..Default::default()
        }))
        .with_text(Text::new("A very helpful tooltip").with_options(TextOptions {
            width: Some(110.0),
            ellipsis: true,
            ..Default::default()
        }))
        .into_ref();

    let button = {
        let hovered_in = hovered.clone();
        let hovered_out = hovered.clone();
        let clicks = clicks.clone();
        ShadowElement::new(100.0, 100.0)
            .with_shape(Mesh::new(rect_path(label_box.width + 20.0, 36.0)))
            .with_text(label)
            .with_contain_fn(Rect::from_size(label_box.width + 20.0, 36.0).contain_fn())
            .with_mouseenter(move |cx| {
                hovered_in.set(true);
                cx.render();
            })
            .with_mouseleave(move |cx| {
                hovered_out.set(false);
                cx.render();
            })
            .with_click(move |cx| {
                clicks.set(clicks.get() + 1);
                println!("  Click at {} (button origin {})", cx.pointer, cx.offset);
            })
            .with_child(tooltip.clone())
            .into_ref()
    };

    graph.update_queue(0, vec![button]);
    graph.update_queue(1, vec![tooltip]);
    graph.start();

    // 3. Simulate a pointer sweeping across the button
    for frame in 1..=6 {
        println!("\n--- Frame {} ---", frame);
        let t = frame as f32 / 6.0;
        let pointer = Vec2::new(80.0, 80.0).lerp(Vec2::new(160.0, 140.0), t);
        graph.trigger_event(CanvasEvent::MouseMove, pointer.x, pointer.y);
        if frame == 4 {
            graph.trigger_event(CanvasEvent::Click, pointer.x, pointer.y);
        }
        graph.tick(frame as f64 * 16.0);

        println!("  Pointer: {}  hovered: {}", pointer, hovered.get());
        for (i, log) in logs.iter().enumerate() {
            let frame_cmds = log.drain();
            let paths = frame_cmds
                .iter()
                .filter(|c| matches!(c, DrawCommand::StrokePath(_) | DrawCommand::FillPath(_)))
                .count();
            let texts = frame_cmds
                .iter()
                .filter(|c| matches!(c, DrawCommand::FillText { .. }))
                .count();
            println!(
                "  Layer {}: {} renders, {} paths, {} texts this frame",
                i,
                graph.layer(i).map_or(0, |l| l.stats().renders),
                paths,
                texts
            );
        }
    }

    println!("\nClicks: {}", clicks.get());
    graph.destroy();
    println!("Demo Complete.");
}
