use std::rc::Rc;

use machigai_core::{AppMode, BoardGeometry, Rect, Side};
use web_sys::{Element, PointerEvent};
use yew::prelude::*;

use crate::assets;
use crate::controller::{AppController, AppSnapshot};
use crate::dom;

const FOUND_MARK_RADIUS: f64 = 24.0;

#[derive(Properties)]
pub(crate) struct BoardProps {
    pub(crate) controller: Rc<AppController>,
    pub(crate) snapshot: Rc<AppSnapshot>,
    pub(crate) side: Side,
    pub(crate) background_ref: NodeRef,
    pub(crate) container_ref: NodeRef,
    pub(crate) on_layout: Callback<()>,
}

impl PartialEq for BoardProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.controller, &other.controller)
            && Rc::ptr_eq(&self.snapshot, &other.snapshot)
            && self.side == other.side
            && self.background_ref == other.background_ref
            && self.container_ref == other.container_ref
            && self.on_layout == other.on_layout
    }
}

struct SpriteView {
    id: String,
    src: String,
    rect: Rect,
}

fn visible_sprites(snapshot: &AppSnapshot, side: Side) -> Vec<SpriteView> {
    let sprites: Vec<SpriteView> = if snapshot.mode == AppMode::Placement {
        snapshot
            .placed
            .iter()
            .map(|sprite| SpriteView {
                id: sprite.id.clone(),
                src: sprite.src.clone(),
                rect: sprite.rect,
            })
            .collect()
    } else {
        let board = match side {
            Side::Left => &snapshot.left,
            Side::Right => &snapshot.right,
        };
        board
            .iter()
            .map(|sprite| SpriteView {
                id: sprite.id.clone(),
                src: sprite.src.clone(),
                rect: sprite.rect,
            })
            .collect()
    };
    sprites
        .into_iter()
        .filter(|sprite| !snapshot.broken_srcs.contains(&sprite.src))
        .collect()
}

fn capture_pointer(container: &NodeRef, event: &PointerEvent) {
    if let Some(element) = container.cast::<Element>() {
        let _ = element.set_pointer_capture(event.pointer_id());
    }
}

fn overlay_rect(layout: &BoardGeometry, rect: &Rect) -> String {
    dom::px_style(&layout.to_container(rect))
}

#[function_component(BoardView)]
pub(crate) fn board_view(props: &BoardProps) -> Html {
    let snapshot = props.snapshot.clone();
    let mode = snapshot.mode;

    let onpointerdown = {
        let controller = props.controller.clone();
        let background_ref = props.background_ref.clone();
        let container_ref = props.container_ref.clone();
        Callback::from(move |event: PointerEvent| {
            let Some(point) = dom::background_point(&background_ref, &event) else {
                return;
            };
            match mode {
                AppMode::Game => controller.click_board(point),
                AppMode::Edit => {
                    event.prevent_default();
                    capture_pointer(&container_ref, &event);
                    controller.box_pointer_down(point);
                }
                AppMode::Placement => {}
            }
        })
    };
    let onpointermove = {
        let controller = props.controller.clone();
        let background_ref = props.background_ref.clone();
        Callback::from(move |event: PointerEvent| {
            let Some(point) = dom::background_point(&background_ref, &event) else {
                return;
            };
            match mode {
                AppMode::Edit => controller.box_pointer_move(point),
                AppMode::Placement => controller.sprite_pointer_move(point),
                AppMode::Game => {}
            }
        })
    };
    let onpointerup = {
        let controller = props.controller.clone();
        let background_ref = props.background_ref.clone();
        Callback::from(move |event: PointerEvent| match mode {
            AppMode::Edit => {
                if let Some(point) = dom::background_point(&background_ref, &event) {
                    controller.box_pointer_up(point);
                }
            }
            AppMode::Placement => controller.sprite_pointer_up(),
            AppMode::Game => {}
        })
    };
    let onload = {
        let on_layout = props.on_layout.clone();
        Callback::from(move |_: Event| on_layout.emit(()))
    };

    let Some(background) = snapshot.background.clone() else {
        return html! {
            <div class="board board-loading" ref={props.container_ref.clone()}>
                <img class="board-background" ref={props.background_ref.clone()} />
            </div>
        };
    };

    let overlays = snapshot.layout.map(|layout| {
        let sprites = visible_sprites(&snapshot, props.side)
            .into_iter()
            .map(|sprite| {
                let selected = mode == AppMode::Placement
                    && snapshot.selected_sprite.as_deref() == Some(sprite.id.as_str());
                let onpointerdown = (mode == AppMode::Placement).then(|| {
                    let controller = props.controller.clone();
                    let background_ref = props.background_ref.clone();
                    let container_ref = props.container_ref.clone();
                    let id = sprite.id.clone();
                    Callback::from(move |event: PointerEvent| {
                        event.stop_propagation();
                        event.prevent_default();
                        let Some(point) = dom::background_point(&background_ref, &event) else {
                            return;
                        };
                        capture_pointer(&container_ref, &event);
                        controller.sprite_pointer_down(&id, point);
                    })
                });
                let onerror = {
                    let controller = props.controller.clone();
                    let src = sprite.src.clone();
                    Callback::from(move |_: Event| controller.sprite_image_failed(&src))
                };
                html! {
                    <img
                        key={sprite.id.clone()}
                        class={classes!("sprite", selected.then_some("selected"))}
                        src={assets::sprite_url(&sprite.src)}
                        style={overlay_rect(&layout, &sprite.rect)}
                        draggable="false"
                        {onpointerdown}
                        {onerror}
                    />
                }
            })
            .collect::<Html>();

        let marks = if mode == AppMode::Game {
            snapshot
                .found_marks
                .iter()
                .map(|center| {
                    let ring = Rect::new(
                        center.x - FOUND_MARK_RADIUS,
                        center.y - FOUND_MARK_RADIUS,
                        FOUND_MARK_RADIUS * 2.0,
                        FOUND_MARK_RADIUS * 2.0,
                    );
                    html! { <div class="found-mark" style={overlay_rect(&layout, &ring)} /> }
                })
                .collect::<Html>()
        } else {
            Html::default()
        };

        let boxes = if mode != AppMode::Game && props.side == Side::Left {
            let drawn = snapshot
                .boxes
                .iter()
                .map(|entry| {
                    html! {
                        <div class="bounding-box" style={overlay_rect(&layout, &entry.rect())}>
                            <span class="bounding-box-label">{ entry.id.to_string() }</span>
                        </div>
                    }
                })
                .collect::<Html>();
            let draft = snapshot.draft_box.map(|rect| {
                html! { <div class="bounding-box draft" style={overlay_rect(&layout, &rect)} /> }
            });
            html! { <>{ drawn }{ for draft }</> }
        } else {
            Html::default()
        };

        html! { <>{ sprites }{ marks }{ boxes }</> }
    });

    html! {
        <div
            class={classes!("board", format!("board-{}", props.side.label()), format!("mode-{}", mode.label()))}
            ref={props.container_ref.clone()}
            {onpointerdown}
            {onpointermove}
            {onpointerup}
        >
            <img
                class="board-background"
                ref={props.background_ref.clone()}
                src={assets::background_url(&background)}
                draggable="false"
                {onload}
            />
            { for overlays }
        </div>
    }
}
