use std::cell::{Cell, RefCell};
use std::rc::Rc;

use depict::math::{rect_path, Rect};
use depict::{
    CommandLog, Context2d, DrawCommand, DrawableOptions, Graph, GraphConfig, LayerOptions, Mesh,
    RecordingSurface, Renderer, ShadowElement, SurfaceBox, Text, TextRect,
};
use depict::{CanvasEvent, ElementRef};
use glam::Vec2;

fn create_test_graph(layers: usize) -> (Graph, Vec<CommandLog>) {
    let mut graph = Graph::new(GraphConfig::default());
    let mut surfaces: Vec<SurfaceBox> = Vec::new();
    let mut logs = Vec::new();
    for _ in 0..layers {
        let surface = RecordingSurface::new(0, 0);
        logs.push(surface.log());
        surfaces.push(Box::new(surface));
    }
    graph.initialize(surfaces, 200.0, 200.0, 1.0, None);
    (graph, logs)
}

fn renders(graph: &Graph, layer: usize) -> u64 {
    graph.layer(layer).map_or(0, |l| l.stats().renders)
}

fn events_built(graph: &Graph, layer: usize) -> u64 {
    graph.layer(layer).map_or(0, |l| l.stats().events_built)
}

fn counter() -> Rc<Cell<u32>> {
    Rc::new(Cell::new(0))
}

fn clickable(x: f32, y: f32, clicks: &Rc<Cell<u32>>) -> ElementRef {
    let clicks = clicks.clone();
    ShadowElement::new(x, y)
        .with_shape(Mesh::new(rect_path(50.0, 50.0)))
        .with_contain_fn(Rect::from_size(50.0, 50.0).contain_fn())
        .with_click(move |_| clicks.set(clicks.get() + 1))
        .into_ref()
}

#[test]
fn test_static_layer_renders_once() {
    // 1. Setup Graph
    let (mut graph, logs) = create_test_graph(1);
    let node = ShadowElement::new(0.0, 0.0)
        .with_shape(Mesh::new("M 0 0 h 10"))
        .into_ref();
    graph.update_queue(0, vec![node]);

    // 2. First frame draws
    graph.start();
    assert_eq!(renders(&graph, 0), 1);
    assert_eq!(logs[0].count(|c| matches!(c, DrawCommand::StrokePath(_))), 1);

    // 3. Nothing changed, nothing drawn
    assert!(graph.tick(16.0));
    assert!(graph.tick(32.0));
    assert_eq!(renders(&graph, 0), 1);

    // 4. Any number of render() calls within a frame cost one pass
    graph.render(0);
    graph.render(0);
    graph.tick(48.0);
    assert_eq!(renders(&graph, 0), 2);
    graph.tick(64.0);
    assert_eq!(renders(&graph, 0), 2);
}

#[test]
fn test_render_pass_clears_the_layer() {
    let (mut graph, logs) = create_test_graph(1);
    graph.start();

    let clear = logs[0].snapshot().into_iter().find(|c| matches!(c, DrawCommand::ClearRect { .. }));
    match clear {
        Some(DrawCommand::ClearRect { x, y, w, h }) => {
            assert_eq!((x, y, w, h), (0.0, 0.0, 200.0, 200.0));
        }
        _ => panic!("Expected a ClearRect"),
    }
}

#[test]
fn test_hover_enter_and_leave() {
    // 1. Setup Graph
    let (mut graph, _logs) = create_test_graph(1);
    let enters = counter();
    let leaves = counter();
    let node = {
        let (enters, leaves) = (enters.clone(), leaves.clone());
        ShadowElement::new(0.0, 0.0)
            .with_contain_fn(Rect::from_size(50.0, 50.0).contain_fn())
            .with_mouseenter(move |_| enters.set(enters.get() + 1))
            .with_mouseleave(move |_| leaves.set(leaves.get() + 1))
            .into_ref()
    };
    graph.update_queue(0, vec![node]);
    graph.start();

    // 2. Move around
    graph.trigger_event(CanvasEvent::MouseMove, 100.0, 100.0);
    assert_eq!((enters.get(), leaves.get()), (0, 0));

    graph.trigger_event(CanvasEvent::MouseMove, 10.0, 10.0);
    assert_eq!((enters.get(), leaves.get()), (1, 0));

    graph.trigger_event(CanvasEvent::MouseMove, 10.0, 11.0);
    assert_eq!((enters.get(), leaves.get()), (1, 0));

    graph.trigger_event(CanvasEvent::MouseMove, 200.0, 200.0);
    assert_eq!((enters.get(), leaves.get()), (1, 1));
}

#[test]
fn test_mouse_move_reaches_every_mover() {
    let (mut graph, _logs) = create_test_graph(1);
    let moves = counter();
    let points = Rc::new(RefCell::new(Vec::new()));

    let make = |x: f32| {
        let moves = moves.clone();
        let points = points.clone();
        ShadowElement::new(x, 0.0)
            .with_contain_fn(Rect::from_size(10.0, 10.0).contain_fn())
            .with_mousemove(move |cx| {
                moves.set(moves.get() + 1);
                points.borrow_mut().push(cx.pointer);
            })
            .into_ref()
    };
    graph.update_queue(0, vec![make(0.0), make(100.0)]);
    graph.start();

    // Moves are not hit-tested and never count as handled.
    let handled = graph.trigger_event(CanvasEvent::MouseMove, 500.0, 500.0);
    assert!(!handled);
    assert_eq!(moves.get(), 2);
    assert!(points.borrow().iter().all(|p| *p == Vec2::new(500.0, 500.0)));
}

#[test]
fn test_update_queue_keeps_event_registrations() {
    // 1. Setup Graph
    let (mut graph, _logs) = create_test_graph(1);
    let clicks = counter();
    let node = clickable(0.0, 0.0, &clicks);
    graph.update_queue(0, vec![node.clone()]);
    graph.start();
    assert_eq!(events_built(&graph, 0), 1);

    // 2. Same element again: rendered, not registered again
    graph.update_queue(0, vec![node.clone()]);
    graph.tick(16.0);
    assert_eq!(renders(&graph, 0), 2);
    assert_eq!(events_built(&graph, 0), 1);

    // 3. Reset rebuilds from scratch
    graph.reset_queue(0, vec![node]);
    graph.tick(32.0);
    assert_eq!(events_built(&graph, 0), 2);

    assert!(graph.trigger_event(CanvasEvent::Click, 10.0, 10.0));
    assert_eq!(clicks.get(), 1);
}

#[test]
fn test_reordered_queue_changes_who_is_on_top() {
    // 1. Two overlapping boxes, b drawn last
    let (mut graph, _logs) = create_test_graph(1);
    let (a_clicks, b_clicks) = (counter(), counter());
    let a = clickable(0.0, 0.0, &a_clicks);
    let b = clickable(0.0, 0.0, &b_clicks);
    graph.update_queue(0, vec![a.clone(), b.clone()]);
    graph.start();
    assert!(graph.trigger_event(CanvasEvent::Click, 10.0, 10.0));
    assert_eq!((a_clicks.get(), b_clicks.get()), (0, 1));

    // 2. Swap them: a is now drawn last and takes the click
    graph.update_queue(0, vec![b.clone(), a.clone()]);
    graph.tick(16.0);
    assert_eq!(events_built(&graph, 0), 2);
    let idx = |el: &ElementRef| {
        let id = el.borrow().id();
        graph.layer(0).and_then(|l| l.runtime_state(id)).map(|s| s.idx)
    };
    assert_eq!((idx(&a), idx(&b)), (Some(2), Some(1)));

    assert!(graph.trigger_event(CanvasEvent::Click, 10.0, 10.0));
    assert_eq!((a_clicks.get(), b_clicks.get()), (1, 1));
}

#[test]
fn test_prepended_background_stays_underneath() {
    let (mut graph, _logs) = create_test_graph(1);
    let (button_clicks, background_clicks) = (counter(), counter());
    let button = clickable(0.0, 0.0, &button_clicks);
    graph.update_queue(0, vec![button.clone()]);
    graph.start();

    // 1. Slide a background in front of the queue
    let background = clickable(0.0, 0.0, &background_clicks);
    graph.update_queue(0, vec![background, button]);
    graph.tick(16.0);

    // 2. The button is still drawn on top
    assert!(graph.trigger_event(CanvasEvent::Click, 10.0, 10.0));
    assert_eq!(button_clicks.get(), 1);
    assert_eq!(background_clicks.get(), 0);
}

#[test]
fn test_hover_follows_the_new_stacking() {
    let (mut graph, _logs) = create_test_graph(1);
    let entered = Rc::new(RefCell::new(Vec::new()));
    let hoverable = |name: &'static str| {
        let entered = entered.clone();
        ShadowElement::new(0.0, 0.0)
            .with_contain_fn(Rect::from_size(50.0, 50.0).contain_fn())
            .with_mouseenter(move |_| entered.borrow_mut().push(name))
            .into_ref()
    };
    let a = hoverable("a");
    let b = hoverable("b");
    graph.update_queue(0, vec![a.clone(), b.clone()]);
    graph.start();
    graph.update_queue(0, vec![b, a]);
    graph.tick(16.0);

    // Both enter, topmost first
    graph.trigger_event(CanvasEvent::MouseMove, 10.0, 10.0);
    assert_eq!(*entered.borrow(), vec!["a", "b"]);
}

#[test]
fn test_removed_element_stops_receiving_events() {
    let (mut graph, _logs) = create_test_graph(1);
    let clicks = counter();
    let node = clickable(0.0, 0.0, &clicks);
    graph.update_queue(0, vec![node.clone()]);
    graph.start();

    // 1. Drop it from the queue
    graph.update_queue(0, Vec::new());
    graph.tick(16.0);
    assert!(!graph.trigger_event(CanvasEvent::Click, 10.0, 10.0));
    assert_eq!(clicks.get(), 0);
    let id = node.borrow().id();
    assert!(graph.layer(0).and_then(|l| l.runtime_state(id)).is_some_and(|s| s.destroyed));

    // 2. Bring it back: registered again, fires once
    graph.update_queue(0, vec![node.clone()]);
    graph.tick(32.0);
    assert_eq!(events_built(&graph, 0), 2);
    assert!(graph.trigger_event(CanvasEvent::Click, 10.0, 10.0));
    assert_eq!(clicks.get(), 1);
    assert!(graph.layer(0).and_then(|l| l.runtime_state(id)).is_some_and(|s| !s.destroyed));
}

#[test]
fn test_hidden_element_is_not_drawn_nor_hit() {
    let (mut graph, logs) = create_test_graph(1);
    let clicks = counter();
    let node = clickable(0.0, 0.0, &clicks);
    node.borrow_mut().hidden = true;
    graph.update_queue(0, vec![node.clone()]);
    graph.start();

    assert_eq!(logs[0].count(|c| matches!(c, DrawCommand::StrokePath(_))), 0);
    assert!(!graph.trigger_event(CanvasEvent::Click, 10.0, 10.0));

    node.borrow_mut().hidden = false;
    graph.render(0);
    graph.tick(16.0);
    assert_eq!(logs[0].count(|c| matches!(c, DrawCommand::StrokePath(_))), 1);
    assert!(graph.trigger_event(CanvasEvent::Click, 10.0, 10.0));
    assert_eq!(clicks.get(), 1);
}

#[test]
fn test_children_are_drawn_relative_to_parents() {
    // 1. Setup tree
    let (mut graph, logs) = create_test_graph(1);
    let child = ShadowElement::new(5.0, 5.0)
        .with_shape(Mesh::new("child"))
        .into_ref();
    let pinned = ShadowElement::new(5.0, 5.0)
        .absolute(true)
        .with_shape(Mesh::new("pinned"))
        .into_ref();
    let parent = ShadowElement::new(10.0, 10.0)
        .with_shape(Mesh::new("parent"))
        .with_children([child.clone(), pinned.clone()])
        .into_ref();
    graph.update_queue(0, vec![parent]);
    graph.start();

    // 2. Check translations
    let commands = logs[0].snapshot();
    let translated_to = |path: &str| {
        let at = commands
            .iter()
            .position(|c| *c == DrawCommand::StrokePath(path.to_string()))
            .unwrap_or_else(|| panic!("{path} was not drawn"));
        commands[..at]
            .iter()
            .rev()
            .find_map(|c| match c {
                DrawCommand::Translate { x, y } => Some(Vec2::new(*x, *y)),
                _ => None,
            })
            .unwrap_or_else(|| panic!("{path} was not translated"))
    };
    assert_eq!(translated_to("parent"), Vec2::new(10.0, 10.0));
    assert_eq!(translated_to("child"), Vec2::new(15.0, 15.0));
    assert_eq!(translated_to("pinned"), Vec2::new(5.0, 5.0));

    // 3. Check runtime offsets
    let layer = graph.layer(0).unwrap_or_else(|| panic!("layer 0 missing"));
    let child_state = layer.runtime_state(child.borrow().id()).unwrap_or_default();
    let pinned_state = layer.runtime_state(pinned.borrow().id()).unwrap_or_default();
    assert_eq!(child_state.offset, Vec2::new(10.0, 10.0));
    assert_eq!(pinned_state.offset, Vec2::ZERO);
    assert!(child_state.idx < pinned_state.idx);
}

#[test]
fn test_handler_sees_its_origin() {
    let (mut graph, _logs) = create_test_graph(1);
    let seen = Rc::new(Cell::new(Vec2::ZERO));
    let child = {
        let seen = seen.clone();
        ShadowElement::new(5.0, 5.0)
            .with_contain_fn(Rect::from_size(10.0, 10.0).contain_fn())
            .with_click(move |cx| seen.set(cx.offset))
            .into_ref()
    };
    let parent = ShadowElement::new(10.0, 10.0).with_child(child).into_ref();
    graph.update_queue(0, vec![parent]);
    graph.start();

    // Child spans (15, 15) .. (25, 25) in layer coordinates.
    assert!(!graph.trigger_event(CanvasEvent::Click, 12.0, 12.0));
    assert!(graph.trigger_event(CanvasEvent::Click, 20.0, 20.0));
    assert_eq!(seen.get(), Vec2::new(10.0, 10.0));
}

#[test]
fn test_post_render_hook_draws_at_the_element() {
    let (mut graph, logs) = create_test_graph(1);
    let node = ShadowElement::new(30.0, 40.0)
        .with_post_render(|ctx: &mut dyn Context2d| ctx.fill_text("post", 0.0, 0.0))
        .into_ref();
    graph.update_queue(0, vec![node]);
    graph.start();

    let commands = logs[0].snapshot();
    let at = commands
        .iter()
        .position(|c| matches!(c, DrawCommand::FillText { text, .. } if text == "post"))
        .unwrap_or_else(|| panic!("post render hook did not run"));
    assert_eq!(commands[at - 1], DrawCommand::Translate { x: 30.0, y: 40.0 });
    assert_eq!(commands[at + 1], DrawCommand::Restore);
}

#[test]
fn test_update_hooks_follow_the_update_flag() {
    let (mut graph, _logs) = create_test_graph(1);
    let last = Rc::new(Cell::new(-1.0));
    let node = {
        let last = last.clone();
        ShadowElement::new(0.0, 0.0)
            .with_child(
                ShadowElement::new(0.0, 0.0)
                    .with_update(move |ts| last.set(ts))
                    .into_ref(),
            )
            .into_ref()
    };
    graph.update_queue(0, vec![node]);
    graph.start();
    assert_eq!(last.get(), 0.0);

    // Only layers that render run their hooks.
    graph.tick(16.0);
    assert_eq!(last.get(), 0.0);
    graph.render(0);
    graph.tick(32.0);
    assert_eq!(last.get(), 32.0);

    graph.update_layer_options(
        0,
        LayerOptions {
            update: Some(false),
            ..Default::default()
        },
    );
    graph.render(0);
    graph.tick(48.0);
    assert_eq!(last.get(), 32.0);
    assert_eq!(renders(&graph, 0), 3);
}

#[test]
fn test_dynamic_layer_renders_every_frame() {
    let (mut graph, _logs) = create_test_graph(2);
    graph.update_layer_options(
        1,
        LayerOptions {
            dynamic: Some(true),
            ..Default::default()
        },
    );
    graph.start();
    for frame in 1..=3 {
        graph.tick(frame as f64 * 16.0);
    }
    assert_eq!(renders(&graph, 0), 1);
    assert_eq!(renders(&graph, 1), 4);
}

#[test]
fn test_handler_render_request_marks_layers() {
    let (mut graph, _logs) = create_test_graph(2);
    let node = ShadowElement::new(0.0, 0.0)
        .with_contain_fn(Rect::from_size(10.0, 10.0).contain_fn())
        .with_click(|cx| {
            cx.render();
            cx.render_layer(0);
        })
        .into_ref();
    graph.update_queue(1, vec![node]);
    graph.start();
    assert!(!graph.layer(0).is_some_and(|l| l.should_render()));

    assert!(graph.trigger_event(CanvasEvent::Click, 5.0, 5.0));
    assert!(graph.layer(0).is_some_and(|l| l.should_render()));
    assert!(graph.layer(1).is_some_and(|l| l.should_render()));

    graph.tick(16.0);
    assert_eq!(renders(&graph, 0), 2);
    assert_eq!(renders(&graph, 1), 2);
}

#[test]
fn test_layer_style_is_primed_into_the_context() {
    let (mut graph, logs) = create_test_graph(1);
    graph.start();
    logs[0].clear();

    graph.update_layer_options(
        0,
        LayerOptions {
            drawable_options: Some(DrawableOptions {
                stroke: Some("#f00".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        },
    );
    assert!(logs[0].snapshot().contains(&DrawCommand::StrokeStyle("#f00".to_string())));
}

struct CountingRenderer {
    meshes: Cell<u32>,
}

impl Renderer for CountingRenderer {
    fn draw(&self, _ctx: &mut dyn Context2d, _mesh: &Mesh) {
        self.meshes.set(self.meshes.get() + 1);
    }

    fn write(&self, _ctx: &mut dyn Context2d, _text: &Text) {}

    fn bounding_box(&self, _ctx: &mut dyn Context2d, _text: &Text) -> TextRect {
        TextRect {
            width: 1.0,
            height: 2.0,
        }
    }
}

#[test]
fn test_element_renderer_overrides_the_layer_default() {
    let (mut graph, logs) = create_test_graph(1);
    let renderer = Rc::new(CountingRenderer { meshes: Cell::new(0) });
    let node = ShadowElement::new(0.0, 0.0)
        .with_shape(Mesh::new("a"))
        .with_shape(Mesh::new("b"))
        .with_renderer(renderer.clone())
        .into_ref();
    let plain = ShadowElement::new(0.0, 0.0)
        .with_shape(Mesh::new("c"))
        .into_ref();
    graph.update_queue(0, vec![node, plain]);
    graph.start();

    assert_eq!(renderer.meshes.get(), 2);
    assert_eq!(logs[0].count(|c| matches!(c, DrawCommand::StrokePath(_))), 1);
}
