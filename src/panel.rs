use std::rc::Rc;

use machigai_core::AppMode;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::assets;
use crate::controller::{AppController, AppSnapshot, StatusLine};

#[derive(Properties)]
pub(crate) struct PanelProps {
    pub(crate) controller: Rc<AppController>,
    pub(crate) snapshot: Rc<AppSnapshot>,
}

impl PartialEq for PanelProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.controller, &other.controller)
            && Rc::ptr_eq(&self.snapshot, &other.snapshot)
    }
}

fn action<F>(controller: &Rc<AppController>, run: F) -> Callback<MouseEvent>
where
    F: Fn(&Rc<AppController>) + 'static,
{
    let controller = controller.clone();
    Callback::from(move |_: MouseEvent| run(&controller))
}

fn textarea_value(node: &NodeRef) -> String {
    node.cast::<HtmlTextAreaElement>()
        .map(|area| area.value())
        .unwrap_or_default()
}

#[function_component(Toolbar)]
pub(crate) fn toolbar(props: &PanelProps) -> Html {
    let snapshot = &props.snapshot;
    let mode = snapshot.mode;
    let mode_button = |target: AppMode, label: &'static str| {
        let onclick = action(&props.controller, move |controller| controller.toggle_mode(target));
        html! {
            <button
                class={classes!("mode-toggle", (mode == target).then_some("active"))}
                disabled={snapshot.busy}
                {onclick}
            >
                { label }
            </button>
        }
    };
    let status = snapshot.status.as_ref().map(|status| match status {
        StatusLine::Info(message) => html! { <p class="status">{ message.clone() }</p> },
        StatusLine::Error(message) => html! { <p class="status status-error">{ message.clone() }</p> },
    });
    let game_controls = (mode == AppMode::Game).then(|| {
        html! {
            <>
                <span class="score">{ format!("{} / {}", snapshot.score, snapshot.total) }</span>
                <button
                    disabled={snapshot.busy}
                    onclick={action(&props.controller, |controller| controller.new_game())}
                >
                    { "New puzzle" }
                </button>
                <button onclick={action(&props.controller, |controller| controller.restart_game())}>
                    { "Start over" }
                </button>
                <span class="seed">{ format!("seed {}", snapshot.seed) }</span>
                {
                    for snapshot.share_url.as_ref().map(|url| html! {
                        <a class="share-link" href={url.clone()}>{ "Share this puzzle" }</a>
                    })
                }
            </>
        }
    });
    html! {
        <header class="toolbar">
            { for game_controls }
            { mode_button(AppMode::Edit, "Edit boxes") }
            { mode_button(AppMode::Placement, "Place sprites") }
            { for status }
        </header>
    }
}

#[function_component(EditPanel)]
pub(crate) fn edit_panel(props: &PanelProps) -> Html {
    let import_ref = use_node_ref();
    let snapshot = &props.snapshot;
    let on_import = {
        let controller = props.controller.clone();
        let import_ref = import_ref.clone();
        Callback::from(move |_: MouseEvent| controller.import_boxes(&textarea_value(&import_ref)))
    };
    let rows = snapshot
        .boxes
        .iter()
        .map(|entry| {
            let id = entry.id.clone();
            let onclick = action(&props.controller, move |controller| controller.remove_box(&id));
            html! {
                <li key={entry.id.to_string()}>
                    { format!("{}: {:.0}x{:.0} at {:.0},{:.0}", entry.id, entry.width, entry.height, entry.x, entry.y) }
                    <button {onclick}>{ "Remove" }</button>
                </li>
            }
        })
        .collect::<Html>();
    html! {
        <section class="panel edit-panel">
            <p>{ "Drag on the left picture to draw a placement box." }</p>
            <ul class="box-list">{ rows }</ul>
            <div class="panel-actions">
                <button onclick={action(&props.controller, |controller| controller.export_boxes())}>
                    { "Export" }
                </button>
                <button onclick={on_import}>{ "Import" }</button>
                <button onclick={action(&props.controller, |controller| controller.clear_boxes())}>
                    { "Clear" }
                </button>
            </div>
            <textarea ref={import_ref} class="json" value={snapshot.exported.clone()} />
        </section>
    }
}

#[function_component(PlacementPanel)]
pub(crate) fn placement_panel(props: &PanelProps) -> Html {
    let name_ref = use_node_ref();
    let snapshot = &props.snapshot;
    let busy = snapshot.busy;
    let choices = snapshot
        .sprite_choices
        .iter()
        .map(|src| {
            let checked = snapshot.chosen_srcs.contains(src);
            let onchange = {
                let controller = props.controller.clone();
                let src = src.clone();
                Callback::from(move |_: Event| controller.toggle_choice(&src))
            };
            let on_add = {
                let src = src.clone();
                action(&props.controller, move |controller| controller.add_sprite(&src))
            };
            html! {
                <li key={src.clone()}>
                    <label>
                        <input type="checkbox" {checked} {onchange} disabled={busy} />
                        <img class="sprite-thumb" src={assets::sprite_url(src)} />
                        { src.clone() }
                    </label>
                    <button onclick={on_add} disabled={busy}>{ "Add" }</button>
                </li>
            }
        })
        .collect::<Html>();
    let on_export = {
        let controller = props.controller.clone();
        let name_ref = name_ref.clone();
        Callback::from(move |_: MouseEvent| {
            let name = name_ref
                .cast::<HtmlInputElement>()
                .map(|input| input.value())
                .unwrap_or_default();
            controller.export_template(&name);
        })
    };
    let has_selection = snapshot.selected_sprite.is_some();
    html! {
        <section class="panel placement-panel">
            <p>
                { format!("{} sprites on the board", snapshot.placed.len()) }
                {
                    if snapshot.boxes.is_empty() {
                        html! { <span>{ " (no boxes: anywhere on the background)" }</span> }
                    } else {
                        html! { <span>{ format!(" ({} boxes)", snapshot.boxes.len()) }</span> }
                    }
                }
            </p>
            <ul class="sprite-choices">{ choices }</ul>
            <div class="panel-actions">
                <button
                    disabled={busy || snapshot.chosen_srcs.is_empty()}
                    onclick={action(&props.controller, |controller| controller.place_chosen())}
                >
                    { if busy { "Placing…" } else { "Place chosen sprites" } }
                </button>
                <button
                    disabled={busy || !has_selection}
                    onclick={action(&props.controller, |controller| controller.bring_selected_to_front())}
                >
                    { "Bring to front" }
                </button>
                <button
                    disabled={busy || !has_selection}
                    onclick={action(&props.controller, |controller| controller.send_selected_to_back())}
                >
                    { "Send to back" }
                </button>
                <button
                    disabled={busy || !has_selection}
                    onclick={action(&props.controller, |controller| controller.remove_selected())}
                >
                    { "Remove" }
                </button>
                <button
                    disabled={busy}
                    onclick={action(&props.controller, |controller| controller.load_template_into_placement())}
                >
                    { "Load template" }
                </button>
                <button
                    disabled={busy}
                    onclick={action(&props.controller, |controller| controller.clear_placement())}
                >
                    { "Clear" }
                </button>
            </div>
            <div class="panel-actions">
                <input ref={name_ref} type="text" placeholder="template name" />
                <button onclick={on_export} disabled={busy}>{ "Export template" }</button>
            </div>
            <textarea class="json" readonly={true} value={snapshot.exported.clone()} />
        </section>
    }
}
