mod assets;
mod board_view;
mod controller;
mod dom;
mod panel;
mod router;
mod session_store;

use std::rc::Rc;

use gloo::events::EventListener;
use machigai_core::{AppMode, Side};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::board_view::BoardView;
use crate::controller::AppController;
use crate::panel::{EditPanel, PlacementPanel, Toolbar};

#[function_component(App)]
fn app() -> Html {
    let controller = use_state(AppController::new);
    let controller: Rc<AppController> = (*controller).clone();
    let snapshot = use_state(|| Rc::new(controller.snapshot()));
    let left_background = use_node_ref();
    let left_container = use_node_ref();
    let right_background = use_node_ref();
    let right_container = use_node_ref();

    {
        let controller = controller.clone();
        let snapshot = snapshot.clone();
        use_effect_with((), move |_| {
            let controller_for_cb = controller.clone();
            let subscription = controller.subscribe(Rc::new(move || {
                snapshot.set(Rc::new(controller_for_cb.snapshot()));
            }));
            move || drop(subscription)
        });
    }

    {
        let controller = controller.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let name = router::template_name();
                #[cfg(target_arch = "wasm32")]
                {
                    gloo::console::log!("assets: load", name.clone());
                }
                let loaded = match assets::load_manifest().await {
                    Ok(manifest) => assets::load_template(&name)
                        .await
                        .map(|template| (manifest, template)),
                    Err(err) => Err(err),
                };
                match loaded {
                    Ok((manifest, template)) => controller.set_assets(manifest, template),
                    Err(err) => controller.assets_failed(&err),
                }
            });
            || ()
        });
    }

    let on_layout = {
        let controller = controller.clone();
        let background = left_background.clone();
        let container = left_container.clone();
        Callback::from(move |_: ()| {
            controller.set_layout(dom::read_geometry(&background, &container));
        })
    };

    {
        let on_layout = on_layout.clone();
        use_effect_with((), move |_| {
            let listener = web_sys::window()
                .map(|window| EventListener::new(&window, "resize", move |_| on_layout.emit(())));
            move || drop(listener)
        });
    }

    let snapshot = (*snapshot).clone();
    let mode = snapshot.mode;

    {
        let on_layout = on_layout.clone();
        use_effect_with((mode, snapshot.background.clone()), move |_| {
            on_layout.emit(());
            || ()
        });
    }
    let side_panel = match mode {
        AppMode::Game => Html::default(),
        AppMode::Edit => html! {
            <EditPanel controller={controller.clone()} snapshot={snapshot.clone()} />
        },
        AppMode::Placement => html! {
            <PlacementPanel controller={controller.clone()} snapshot={snapshot.clone()} />
        },
    };
    let right_board = (mode == AppMode::Game).then(|| {
        html! {
            <BoardView
                controller={controller.clone()}
                snapshot={snapshot.clone()}
                side={Side::Right}
                background_ref={right_background.clone()}
                container_ref={right_container.clone()}
                on_layout={Callback::noop()}
            />
        }
    });

    html! {
        <main class={classes!("app", format!("mode-{}", mode.label()), snapshot.complete.then_some("complete"))}>
            <Toolbar controller={controller.clone()} snapshot={snapshot.clone()} />
            <div class="boards">
                <BoardView
                    controller={controller.clone()}
                    snapshot={snapshot.clone()}
                    side={Side::Left}
                    background_ref={left_background.clone()}
                    container_ref={left_container.clone()}
                    on_layout={on_layout}
                />
                { for right_board }
            </div>
            { side_panel }
        </main>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
