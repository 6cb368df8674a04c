use std::cell::RefCell;
use std::rc::Rc;

use gloo::timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;

use machigai_core::{
    AppMode, AssetManifest, BoardGeometry, BoardSprite, BoundingBox, BoundingBoxSet, BoxId,
    ClickOutcome, GameEvent, GameRules, ModeMachine, PlacedSprite, PlacementError,
    PlacementJob, PlacementSession, PlacementWarning, Point, PuzzleGame, Rect, Side, Template,
};

use crate::assets::AssetError;
use crate::dom::MathRandom;
use crate::router;
use crate::session_store;

pub(crate) type AppSubscriber = Rc<dyn Fn()>;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum StatusLine {
    Info(String),
    Error(String),
}

#[derive(Clone, Debug)]
struct DragState {
    id: String,
    /// Pointer minus sprite origin, background-relative.
    grab: Point,
}

struct AppState {
    rules: GameRules,
    modes: ModeMachine,
    seed: u32,
    share_url: Option<String>,
    manifest: Option<Rc<AssetManifest>>,
    template: Option<Rc<Template>>,
    layout: Option<BoardGeometry>,
    game: Option<PuzzleGame>,
    boxes: BoundingBoxSet,
    draft_box: Option<Rect>,
    placement: PlacementSession,
    chosen_srcs: Vec<String>,
    selected_sprite: Option<String>,
    drag: Option<DragState>,
    status: Option<StatusLine>,
    exported: String,
    broken_srcs: Vec<String>,
}

impl AppState {
    fn new(seed: u32) -> Self {
        let rules = GameRules::default();
        Self {
            rules,
            modes: ModeMachine::new(),
            seed,
            share_url: None,
            manifest: None,
            template: None,
            layout: None,
            game: None,
            boxes: BoundingBoxSet::new(),
            draft_box: None,
            placement: PlacementSession::new(rules),
            chosen_srcs: Vec::new(),
            selected_sprite: None,
            drag: None,
            status: None,
            exported: String::new(),
            broken_srcs: Vec::new(),
        }
    }
}

/// Everything the views render, cloned out of the controller after each
/// change.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AppSnapshot {
    pub(crate) mode: AppMode,
    pub(crate) busy: bool,
    pub(crate) seed: u32,
    pub(crate) share_url: Option<String>,
    pub(crate) background: Option<String>,
    pub(crate) layout: Option<BoardGeometry>,
    pub(crate) left: Vec<BoardSprite>,
    pub(crate) right: Vec<BoardSprite>,
    pub(crate) found_marks: Vec<Point>,
    pub(crate) score: usize,
    pub(crate) total: usize,
    pub(crate) complete: bool,
    pub(crate) boxes: Vec<BoundingBox>,
    pub(crate) draft_box: Option<Rect>,
    pub(crate) placed: Vec<PlacedSprite>,
    pub(crate) sprite_choices: Vec<String>,
    pub(crate) chosen_srcs: Vec<String>,
    pub(crate) selected_sprite: Option<String>,
    pub(crate) status: Option<StatusLine>,
    pub(crate) exported: String,
    /// Sprite files that failed to load; views leave them out.
    pub(crate) broken_srcs: Vec<String>,
}

pub(crate) struct AppController {
    state: RefCell<AppState>,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

impl AppController {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(AppState::new(router::initial_seed())),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        })
    }

    pub(crate) fn subscribe(&self, subscriber: AppSubscriber) -> AppSubscription {
        self.subscribers.borrow_mut().push(subscriber.clone());
        AppSubscription {
            subscriber,
            subscribers: Rc::clone(&self.subscribers),
        }
    }

    fn notify(&self) {
        let subscribers = self.subscribers.borrow().clone();
        for subscriber in subscribers {
            (subscriber)();
        }
    }

    pub(crate) fn snapshot(&self) -> AppSnapshot {
        let state = self.state.borrow();
        let (left, right, found_marks, score, total, complete) = match state.game.as_ref() {
            Some(game) => (
                game.board(Side::Left).sprites.clone(),
                game.board(Side::Right).sprites.clone(),
                game.differences()
                    .iter()
                    .filter(|difference| game.is_found(&difference.id))
                    .map(|difference| difference.center())
                    .collect::<Vec<Point>>(),
                game.score(),
                game.total(),
                game.is_complete(),
            ),
            None => (Vec::new(), Vec::new(), Vec::new(), 0, 0, false),
        };
        let background = match state.modes.current() {
            AppMode::Placement => state
                .placement
                .background()
                .map(str::to_string)
                .or_else(|| state.template.as_ref().map(|t| t.background.clone())),
            _ => state.template.as_ref().map(|template| template.background.clone()),
        };
        AppSnapshot {
            mode: state.modes.current(),
            busy: state.modes.is_busy(),
            seed: state.seed,
            share_url: state.share_url.clone(),
            background,
            layout: state.layout,
            left,
            right,
            found_marks,
            score,
            total,
            complete,
            boxes: state.boxes.boxes().to_vec(),
            draft_box: state.draft_box,
            placed: state.placement.sprites().to_vec(),
            sprite_choices: state
                .manifest
                .as_ref()
                .map(|manifest| {
                    manifest
                        .sprites
                        .iter()
                        .map(|entry| entry.filename.clone())
                        .collect()
                })
                .unwrap_or_default(),
            chosen_srcs: state.chosen_srcs.clone(),
            selected_sprite: state.selected_sprite.clone(),
            status: state.status.clone(),
            exported: state.exported.clone(),
            broken_srcs: state.broken_srcs.clone(),
        }
    }

    fn set_status(&self, status: StatusLine) {
        self.state.borrow_mut().status = Some(status);
        self.notify();
    }

    pub(crate) fn set_assets(&self, manifest: AssetManifest, template: Template) {
        if let Err(err) = template.validate_against(&manifest) {
            #[cfg(target_arch = "wasm32")]
            {
                gloo::console::warn!("assets: template rejected", err.to_string());
            }
            self.set_status(StatusLine::Error(err.to_string()));
            return;
        }
        {
            let mut state = self.state.borrow_mut();
            state.manifest = Some(Rc::new(manifest));
            state.template = Some(Rc::new(template));
        }
        self.notify();
        self.start_game_if_ready();
    }

    /// A sprite image failed to load. The sprite is dropped from view and
    /// from the running puzzle; the rest of the board carries on.
    pub(crate) fn sprite_image_failed(&self, src: &str) {
        {
            let mut state = self.state.borrow_mut();
            if state.broken_srcs.iter().any(|broken| broken == src) {
                return;
            }
            #[cfg(target_arch = "wasm32")]
            {
                gloo::console::warn!("assets: sprite image failed", src);
            }
            state.broken_srcs.push(src.to_string());
            if let Some(game) = state.game.as_mut() {
                let dropped = game.drop_src(src);
                if dropped > 0 {
                    let total = game.total();
                    let status = status_for_events(game.take_events()).unwrap_or_else(|| {
                        StatusLine::Info(format!(
                            "A picture failed to load; {total} differences left to find"
                        ))
                    });
                    state.status = Some(status);
                }
            }
        }
        self.notify();
    }

    pub(crate) fn assets_failed(&self, err: &AssetError) {
        #[cfg(target_arch = "wasm32")]
        {
            gloo::console::warn!("assets: load failed", err.to_string());
        }
        if err.is_validation() {
            self.set_status(StatusLine::Error(err.to_string()));
        }
    }

    /// Stores freshly read board geometry and rescales a running puzzle to
    /// it. Missing geometry is logged and left for the next layout pass.
    pub(crate) fn set_layout(&self, layout: Result<BoardGeometry, PlacementError>) {
        let layout = match layout {
            Ok(layout) => layout,
            Err(_err) => {
                #[cfg(target_arch = "wasm32")]
                {
                    gloo::console::log!("layout: skipped", _err.to_string());
                }
                return;
            }
        };
        {
            let mut state = self.state.borrow_mut();
            if state.layout == Some(layout) {
                return;
            }
            state.layout = Some(layout);
            state.boxes.set_bounds(Some(layout.background_size()));
            let AppState {
                game,
                template,
                manifest,
                ..
            } = &mut *state;
            if let (Some(game), Some(template), Some(manifest)) =
                (game.as_mut(), template.as_deref(), manifest.as_deref())
            {
                if game.resize(template, manifest, layout.background_size()) {
                    #[cfg(target_arch = "wasm32")]
                    {
                        gloo::console::log!(
                            "game: rescaled",
                            layout.background.width,
                            layout.background.height
                        );
                    }
                }
            }
        }
        self.notify();
        self.start_game_if_ready();
    }

    fn start_game_if_ready(&self) {
        let (needs_game, seed) = {
            let state = self.state.borrow();
            (state.game.is_none(), state.seed)
        };
        if needs_game {
            self.start_game(seed);
        }
    }

    fn start_game(&self, seed: u32) {
        let started = {
            let mut state = self.state.borrow_mut();
            let (Some(template), Some(manifest), Some(layout)) =
                (state.template.clone(), state.manifest.clone(), state.layout)
            else {
                #[cfg(target_arch = "wasm32")]
                {
                    gloo::console::log!("game: assets or layout not ready");
                }
                return;
            };
            if let Err(err) = state.modes.begin_operation() {
                state.status = Some(StatusLine::Error(err.to_string()));
                None
            } else {
                let (game, warnings) = PuzzleGame::start(
                    &template,
                    &manifest,
                    layout.background_size(),
                    seed,
                    state.rules,
                );
                warn_placement(&warnings);
                #[cfg(target_arch = "wasm32")]
                {
                    gloo::console::log!("game: started", seed, game.total());
                }
                state.status = Some(StatusLine::Info(format!(
                    "Find {} differences",
                    game.total()
                )));
                state.seed = seed;
                state.game = Some(game);
                state.modes.end_operation();
                Some(seed)
            }
        };
        if let Some(seed) = started {
            let share_url = router::write_seed(seed);
            self.state.borrow_mut().share_url = share_url;
        }
        self.notify();
    }

    pub(crate) fn new_game(&self) {
        if self.state.borrow().modes.current() != AppMode::Game {
            return;
        }
        self.start_game(router::fresh_seed());
    }

    pub(crate) fn restart_game(&self) {
        {
            let mut state = self.state.borrow_mut();
            let Some(game) = state.game.as_mut() else {
                return;
            };
            game.reset_progress();
            let total = game.total();
            state.status = Some(StatusLine::Info(format!("Find {total} differences")));
        }
        self.notify();
    }

    /// Player click, background-relative.
    pub(crate) fn click_board(&self, point: Point) {
        {
            let mut state = self.state.borrow_mut();
            if state.modes.current() != AppMode::Game {
                return;
            }
            let Some(game) = state.game.as_mut() else {
                return;
            };
            if matches!(game.click(point), ClickOutcome::Miss) {
                return;
            }
            if let Some(status) = status_for_events(game.take_events()) {
                state.status = Some(status);
            }
        }
        self.notify();
    }

    pub(crate) fn toggle_mode(&self, mode: AppMode) {
        let entered_placement = {
            let mut state = self.state.borrow_mut();
            match state.modes.toggle(mode) {
                Ok(change) => {
                    #[cfg(target_arch = "wasm32")]
                    {
                        gloo::console::log!("mode:", change.from.label(), change.to.label());
                    }
                    if change.from == AppMode::Edit {
                        state.boxes.cancel_draw();
                        state.draft_box = None;
                    }
                    state.drag = None;
                    state.status = None;
                    change.to == AppMode::Placement
                }
                Err(err) => {
                    state.status = Some(StatusLine::Error(err.to_string()));
                    false
                }
            }
        };
        if entered_placement {
            self.prepare_placement();
        }
        self.notify();
    }

    fn prepare_placement(&self) {
        let mut state = self.state.borrow_mut();
        if state.placement.is_empty() {
            if let Some(snapshot) = session_store::load_placement_snapshot() {
                if let Err(_err) = state.placement.restore(snapshot) {
                    #[cfg(target_arch = "wasm32")]
                    {
                        gloo::console::log!("placement snapshot: restore failed", _err.to_string());
                    }
                }
            }
        }
        if state.placement.background().is_none() {
            let background = state.template.as_ref().map(|t| t.background.clone());
            let size = state.layout.map(|layout| layout.background_size());
            if let (Some(background), Some(size)) = (background, size) {
                state.placement.set_background(background, size);
            }
        }
    }

    // Edit mode

    pub(crate) fn box_pointer_down(&self, point: Point) {
        {
            let mut state = self.state.borrow_mut();
            if state.modes.current() != AppMode::Edit {
                return;
            }
            state.boxes.begin_draw(point);
            state.draft_box = state.boxes.update_draw(point);
        }
        self.notify();
    }

    pub(crate) fn box_pointer_move(&self, point: Point) {
        {
            let mut state = self.state.borrow_mut();
            if !state.boxes.is_drawing() {
                return;
            }
            state.draft_box = state.boxes.update_draw(point);
        }
        self.notify();
    }

    pub(crate) fn box_pointer_up(&self, point: Point) {
        {
            let mut state = self.state.borrow_mut();
            if !state.boxes.is_drawing() {
                return;
            }
            state.draft_box = None;
            if state.boxes.commit_draw(point).is_none() {
                #[cfg(target_arch = "wasm32")]
                {
                    gloo::console::log!("edit: box too small, discarded");
                }
            }
        }
        self.notify();
    }

    pub(crate) fn remove_box(&self, id: &BoxId) {
        self.state.borrow_mut().boxes.remove(id);
        self.notify();
    }

    pub(crate) fn clear_boxes(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.boxes.clear();
            state.draft_box = None;
        }
        self.notify();
    }

    pub(crate) fn export_boxes(&self) {
        {
            let mut state = self.state.borrow_mut();
            match state.boxes.export_json() {
                Ok(json) => state.exported = json,
                Err(err) => state.status = Some(StatusLine::Error(err.to_string())),
            }
        }
        self.notify();
    }

    pub(crate) fn import_boxes(&self, raw: &str) {
        {
            let mut state = self.state.borrow_mut();
            match state.boxes.import_json(raw) {
                Ok(count) => {
                    state.status = Some(StatusLine::Info(format!("Imported {count} boxes")));
                }
                Err(err) => {
                    #[cfg(target_arch = "wasm32")]
                    {
                        gloo::console::warn!("edit: import rejected", err.to_string());
                    }
                    state.status = Some(StatusLine::Error(err.to_string()));
                }
            }
        }
        self.notify();
    }

    // Placement mode

    pub(crate) fn toggle_choice(&self, src: &str) {
        {
            let mut state = self.state.borrow_mut();
            if let Some(index) = state.chosen_srcs.iter().position(|chosen| chosen == src) {
                state.chosen_srcs.remove(index);
            } else {
                state.chosen_srcs.push(src.to_string());
            }
        }
        self.notify();
    }

    /// Replaces the authoring board with every chosen sprite, placed one at a
    /// time with a short pause between sprites.
    pub(crate) fn place_chosen(self: &Rc<Self>) {
        let plan = {
            let mut state = self.state.borrow_mut();
            if state.modes.current() != AppMode::Placement {
                return;
            }
            let Some(manifest) = state.manifest.clone() else {
                return;
            };
            match state.modes.begin_operation() {
                Ok(()) => {
                    let srcs = state.chosen_srcs.clone();
                    let regions = state.boxes.rects();
                    state.selected_sprite = None;
                    state.drag = None;
                    let (jobs, warnings) = state.placement.begin_bulk(&srcs, &manifest, &regions);
                    Some((jobs, warnings, state.rules.placement_pacing_ms))
                }
                Err(err) => {
                    state.status = Some(StatusLine::Error(err.to_string()));
                    None
                }
            }
        };
        self.notify();
        let Some((jobs, warnings, pacing_ms)) = plan else {
            return;
        };
        warn_placement(&warnings);
        let controller = Rc::clone(self);
        spawn_local(async move {
            let mut rng = MathRandom;
            for job in &jobs {
                TimeoutFuture::new(pacing_ms).await;
                if !controller.place_job(job, &mut rng) {
                    break;
                }
            }
            controller.finish_bulk();
        });
    }

    fn place_job(&self, job: &PlacementJob, rng: &mut MathRandom) -> bool {
        {
            let mut state = self.state.borrow_mut();
            let Some(layout) = state.layout else {
                #[cfg(target_arch = "wasm32")]
                {
                    gloo::console::log!("placement: background unavailable");
                }
                return false;
            };
            let placement = state.placement.place_job(job, &layout, rng);
            if !placement.collision_free {
                warn_placement(&[PlacementWarning::Overlapping {
                    id: placement.id,
                    attempts: placement.attempts,
                }]);
            }
        }
        self.notify();
        true
    }

    fn finish_bulk(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.modes.end_operation();
            let count = state.placement.sprites().len();
            state.status = Some(StatusLine::Info(format!("Placed {count} sprites")));
        }
        self.persist_placement();
        self.notify();
    }

    /// Drops one sprite in the middle of the background.
    pub(crate) fn add_sprite(&self, src: &str) {
        {
            let mut state = self.state.borrow_mut();
            if state.modes.current() != AppMode::Placement || state.modes.is_busy() {
                return;
            }
            let (Some(manifest), Some(layout)) = (state.manifest.clone(), state.layout) else {
                return;
            };
            let center = layout.background_bounds().center();
            match state.placement.add_at(src, &manifest, center) {
                Some(id) => state.selected_sprite = Some(id),
                None => {
                    #[cfg(target_arch = "wasm32")]
                    {
                        gloo::console::warn!("placement: asset missing", src);
                    }
                }
            }
        }
        self.persist_placement();
        self.notify();
    }

    pub(crate) fn sprite_pointer_down(&self, id: &str, point: Point) {
        {
            let mut state = self.state.borrow_mut();
            if state.modes.current() != AppMode::Placement || state.modes.is_busy() {
                return;
            }
            let Some(sprite) = state.placement.sprite(id) else {
                return;
            };
            let grab = Point::new(point.x - sprite.rect.x, point.y - sprite.rect.y);
            state.drag = Some(DragState {
                id: id.to_string(),
                grab,
            });
            state.selected_sprite = Some(id.to_string());
        }
        self.notify();
    }

    pub(crate) fn sprite_pointer_move(&self, point: Point) {
        {
            let mut state = self.state.borrow_mut();
            let Some(drag) = state.drag.clone() else {
                return;
            };
            let origin = Point::new(point.x - drag.grab.x, point.y - drag.grab.y);
            state.placement.move_to(&drag.id, origin);
        }
        self.notify();
    }

    pub(crate) fn sprite_pointer_up(&self) {
        if self.state.borrow_mut().drag.take().is_none() {
            return;
        }
        self.persist_placement();
        self.notify();
    }

    pub(crate) fn bring_selected_to_front(&self) {
        self.edit_selected(|placement, id| placement.bring_to_front(id));
    }

    pub(crate) fn send_selected_to_back(&self) {
        self.edit_selected(|placement, id| placement.send_to_back(id));
    }

    pub(crate) fn remove_selected(&self) {
        self.edit_selected(|placement, id| placement.remove(id));
        let selected = self.state.borrow().selected_sprite.clone();
        if let Some(id) = selected {
            let mut state = self.state.borrow_mut();
            if state.placement.sprite(&id).is_none() {
                state.selected_sprite = None;
            }
        }
        self.notify();
    }

    fn edit_selected<F>(&self, edit: F)
    where
        F: FnOnce(&mut PlacementSession, &str) -> bool,
    {
        let changed = {
            let mut state = self.state.borrow_mut();
            if state.modes.is_busy() {
                return;
            }
            let Some(id) = state.selected_sprite.clone() else {
                return;
            };
            edit(&mut state.placement, &id)
        };
        if changed {
            self.persist_placement();
            self.notify();
        }
    }

    pub(crate) fn clear_placement(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.modes.is_busy() {
                return;
            }
            state.placement.clear();
            state.selected_sprite = None;
            state.drag = None;
        }
        session_store::clear_placement_snapshot();
        self.notify();
    }

    pub(crate) fn load_template_into_placement(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.modes.is_busy() {
                return;
            }
            let (Some(template), Some(manifest), Some(layout)) =
                (state.template.clone(), state.manifest.clone(), state.layout)
            else {
                #[cfg(target_arch = "wasm32")]
                {
                    gloo::console::log!("placement: template or layout not ready");
                }
                return;
            };
            let report = state.placement.load_template(&template, &manifest, &layout);
            warn_placement(&report.warnings);
            state.selected_sprite = None;
            state.status = Some(StatusLine::Info(format!(
                "Loaded {} sprites from {}",
                report.placed.len(),
                template.name
            )));
        }
        self.persist_placement();
        self.notify();
    }

    pub(crate) fn export_template(&self, name: &str) {
        {
            let mut state = self.state.borrow_mut();
            let original = state.placement.background().and_then(|background| {
                state
                    .manifest
                    .as_ref()
                    .and_then(|manifest| manifest.background(background))
                    .and_then(|entry| entry.dimensions())
            });
            let name = if name.trim().is_empty() {
                "untitled"
            } else {
                name.trim()
            };
            let exported = state
                .placement
                .to_template(name, original)
                .map_err(|err| err.to_string())
                .and_then(|template| template.to_json_pretty().map_err(|err| err.to_string()));
            match exported {
                Ok(json) => state.exported = json,
                Err(message) => state.status = Some(StatusLine::Error(message)),
            }
        }
        self.notify();
    }

    fn persist_placement(&self) {
        let snapshot = self.state.borrow().placement.snapshot();
        session_store::save_placement_snapshot(&snapshot);
    }
}

/// Status line for the latest of `events`, if any.
fn status_for_events(events: Vec<GameEvent>) -> Option<StatusLine> {
    let mut status = None;
    for event in events {
        match event {
            GameEvent::Found {
                id: _id,
                found,
                total,
            } => {
                #[cfg(target_arch = "wasm32")]
                {
                    gloo::console::log!("game: found", _id);
                }
                status = Some(StatusLine::Info(format!("Found {found} of {total}")));
            }
            GameEvent::Completed { total } => {
                status = Some(StatusLine::Info(format!("All {total} differences found!")));
            }
        }
    }
    status
}

fn warn_placement(warnings: &[PlacementWarning]) {
    #[cfg(target_arch = "wasm32")]
    for warning in warnings {
        match warning {
            PlacementWarning::AssetMissing { id, src } => {
                gloo::console::warn!("placement: asset missing", id, src);
            }
            PlacementWarning::Overlapping { id, attempts } => {
                gloo::console::log!("placement: overlapping", id, *attempts);
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = warnings;
}

pub(crate) struct AppSubscription {
    subscriber: AppSubscriber,
    subscribers: Rc<RefCell<Vec<AppSubscriber>>>,
}

impl Drop for AppSubscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|item| !Rc::ptr_eq(item, &self.subscriber));
    }
}
