use crate::geometry::Point;
use crate::gui::menu::{self, Session};
use crate::gui::theme::{self, ThemeColors};
use crate::gui::window;
use crate::launch;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

pub struct AppModel {
    pub session: Rc<RefCell<Session>>,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
    /// Live handle of the outside-pointer poll; cleared when the poll stops
    /// itself or is stopped at the start of the close sequence.
    poll_source: Rc<RefCell<Option<glib::SourceId>>>,
}

#[derive(Debug, Clone, Copy, strum::Display)]
pub enum DismissTrigger {
    Escape,
    PointerLeft,
}

#[derive(Debug)]
pub enum AppMsg {
    /// The window is mapped; place the ring under the pointer and start
    /// the entrance animation and the outside-pointer poll.
    Opened,
    Click(Point),
    CursorMove(Point),
    Dismiss(DismissTrigger),
    /// The exit animation has run its full duration.
    CloseFinished,
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = Session;
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Whirl"),
            add_css_class: "whirl-window",
            set_decorated: false,

            connect_map[sender] => move |_| {
                sender.input(AppMsg::Opened);
            },

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Dismiss(DismissTrigger::Escape));
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "whirl-drawing-area",

                add_controller = gtk::EventControllerMotion {
                    connect_motion[sender] => move |_, x, y| {
                        sender.input(AppMsg::CursorMove(Point::new(x, y)));
                    }
                },

                add_controller = gtk::GestureClick {
                    connect_released[sender] => move |_, _, x, y| {
                        sender.input(AppMsg::Click(Point::new(x, y)));
                    }
                }
            }
        }
    }

    fn init(
        session: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        theme::load_css();
        window::init_layer_shell(&root);

        let session = Rc::new(RefCell::new(session));

        let model = AppModel {
            session: session.clone(),
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
            poll_source: Rc::new(RefCell::new(None)),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let state_draw = session.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = menu::draw(cr, &state_draw.borrow(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        // Single animation driver: every tween advances on the frame clock.
        let state_tick = session.clone();
        let tick_sender = sender.clone();
        let last_frame = Cell::new(None::<i64>);
        let _ = widgets.drawing_area.add_tick_callback(move |area, clock| {
            let now = clock.frame_time();
            let dt = match last_frame.replace(Some(now)) {
                Some(prev) => Duration::from_micros(now.saturating_sub(prev).max(0) as u64),
                None => Duration::ZERO,
            };

            let tick = state_tick.borrow_mut().tick(dt);
            if tick.should_redraw {
                area.queue_draw();
            }
            if tick.finished {
                tick_sender.input(AppMsg::CloseFinished);
                return glib::ControlFlow::Break;
            }
            glib::ControlFlow::Continue
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Opened => {
                let center = window::get_cursor_position(&self.root).unwrap_or_else(|| {
                    Point::new(
                        self.root.width() as f64 / 2.0,
                        self.root.height() as f64 / 2.0,
                    )
                });
                self.session.borrow_mut().open_at(center);
                self.drawing_area.queue_draw();
                self.start_outside_poll(&sender);
            }
            AppMsg::Click(point) => {
                let mut state = self.session.borrow_mut();
                if state.is_closing() {
                    return;
                }
                if let Some(idx) = state.hit_test(point) {
                    let item = &state.buttons()[idx].item;
                    log::info!("Activating '{}'", item.label);
                    if let Err(e) = launch::spawn_detached(&item.command) {
                        // Fire-and-forget: a broken command still dismisses.
                        log::debug!("Launch failed for '{}': {}", item.label, e);
                    }
                    state.begin_close();
                    drop(state);
                    self.stop_outside_poll();
                }
            }
            AppMsg::CursorMove(point) => {
                if self.session.borrow_mut().update_cursor(point) {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Dismiss(trigger) => {
                if self.session.borrow_mut().begin_close() {
                    log::debug!("Dismissed ({})", trigger);
                    self.stop_outside_poll();
                }
            }
            AppMsg::CloseFinished => {
                self.root.set_visible(false);
                relm4::main_application().quit();
            }
        }
    }
}

impl AppModel {
    /// 50 ms pointer poll while the menu is open. The host compositor has no
    /// portable "pointer left the menu" event, so this stays a periodic
    /// check. It breaks itself no later than the start of the close phase.
    fn start_outside_poll(&self, sender: &ComponentSender<Self>) {
        let session = self.session.clone();
        let window = self.root.clone();
        let sender = sender.clone();
        let interval = self.session.borrow().poll_interval();
        let poll_source = self.poll_source.clone();

        let id = glib::timeout_add_local(interval, {
            let poll_source = poll_source.clone();
            move || {
                let state = session.borrow();
                if state.is_closing() {
                    *poll_source.borrow_mut() = None;
                    return glib::ControlFlow::Break;
                }
                if let Some(cursor) = window::get_cursor_position(&window)
                    && !state.bounds().contains(cursor)
                {
                    drop(state);
                    *poll_source.borrow_mut() = None;
                    sender.input(AppMsg::Dismiss(DismissTrigger::PointerLeft));
                    return glib::ControlFlow::Break;
                }
                glib::ControlFlow::Continue
            }
        });
        *poll_source.borrow_mut() = Some(id);
    }

    fn stop_outside_poll(&self) {
        if let Some(id) = self.poll_source.borrow_mut().take() {
            id.remove();
        }
    }
}
