use crate::anim::Tween;
use crate::config::{MenuConfig, MenuItem};
use crate::geometry::{Point, Rect};
use crate::gui::menu::ICON_PADDING;
use gdk_pixbuf::Pixbuf;
use std::f64::consts::PI;
use std::time::Duration;

/// One button of the ring. Geometry and opacity are plain fields driven by
/// the owned tweens; nothing outside the session ever mutates them.
pub struct MenuButton {
    pub item: MenuItem,
    pub pixbuf: Option<Pixbuf>,
    rect: Rect,
    opacity: f64,
    geometry: Option<Tween<Rect>>,
    fade: Option<Tween<f64>>,
}

impl MenuButton {
    fn new(item: MenuItem, collapsed: Rect, icon_size: f64) -> Self {
        let pixbuf = Self::load_icon(&item, icon_size);
        Self {
            item,
            pixbuf,
            rect: collapsed,
            opacity: 0.0,
            geometry: None,
            fade: None,
        }
    }

    fn load_icon(item: &MenuItem, icon_size: f64) -> Option<Pixbuf> {
        (!item.icon.as_os_str().is_empty()).then(|| {
            Pixbuf::from_file_at_scale(&item.icon, icon_size as i32, icon_size as i32, true).ok()
        })?
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Paintable opacity. The raw animated value may overshoot [0, 1] under
    /// the back curves; clamping here keeps sampled opacity monotonic within
    /// a phase.
    pub fn opacity(&self) -> f64 {
        self.opacity.clamp(0.0, 1.0)
    }

    fn tick(&mut self, dt: Duration) -> bool {
        let mut moved = false;
        if let Some(tween) = &mut self.geometry {
            self.rect = tween.advance(dt);
            if tween.is_finished() {
                self.geometry = None;
            }
            moved = true;
        }
        if let Some(tween) = &mut self.fade {
            self.opacity = tween.advance(dt);
            if tween.is_finished() {
                self.fade = None;
            }
            moved = true;
        }
        moved
    }

    fn contains(&self, p: Point) -> bool {
        self.rect.center().distance(p) <= self.rect.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Closing { elapsed: Duration },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Tick {
    pub should_redraw: bool,
    /// Set once the close phase has run its full duration. The caller tears
    /// the window down on seeing this.
    pub finished: bool,
}

/// The single live menu instance: items, buttons, running tweens and the
/// open/closing flag. `Open -> Closing` happens at most once.
pub struct Session {
    center: Point,
    items: Vec<MenuItem>,
    buttons: Vec<MenuButton>,
    hover: Option<usize>,
    phase: Phase,
    menu: MenuConfig,
}

impl Session {
    pub fn new(items: Vec<MenuItem>, menu: MenuConfig) -> Self {
        Self {
            center: Point::default(),
            items,
            buttons: Vec::new(),
            hover: None,
            phase: Phase::Open,
            menu,
        }
    }

    /// Places the ring around `center` and starts the entrance animation:
    /// every button gets a geometry tween from the collapsed center rect to
    /// its ring position and a fade from 0 to 1, all starting together.
    pub fn open_at(&mut self, center: Point) {
        if self.is_closing() {
            return;
        }
        self.center = center;

        let items = std::mem::take(&mut self.items);
        let count = items.len();
        let collapsed = Rect::centered_at(center, self.menu.button_size);
        let duration = Duration::from_millis(self.menu.open_ms);
        let icon_size = self.menu.button_size - ICON_PADDING;

        self.buttons = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let mut button = MenuButton::new(item, collapsed, icon_size);
                button.geometry = Some(Tween::new(
                    collapsed,
                    self.ring_target(i, count),
                    duration,
                    self.menu.open_easing,
                ));
                button.fade = Some(Tween::new(0.0, 1.0, duration, self.menu.open_easing));
                button
            })
            .collect();
    }

    /// Final rect of button `index` out of `count`: centered on the ring at
    /// angle 2*PI*index/count, measured from the 3 o'clock position.
    pub fn ring_target(&self, index: usize, count: usize) -> Rect {
        let angle = 2.0 * PI * index as f64 / count as f64;
        let center = Point::new(
            self.center.x + self.menu.ring_radius * angle.cos(),
            self.center.y + self.menu.ring_radius * angle.sin(),
        );
        Rect::centered_at(center, self.menu.button_size)
    }

    /// The window's footprint, used by the outside-pointer poll.
    pub fn bounds(&self) -> Rect {
        Rect::centered_at(self.center, self.menu.window_size)
    }

    pub fn buttons(&self) -> &[MenuButton] {
        &self.buttons
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.menu.poll_ms)
    }

    pub fn hover(&self) -> Option<usize> {
        self.hover
    }

    pub fn is_closing(&self) -> bool {
        matches!(self.phase, Phase::Closing { .. })
    }

    pub fn is_finished(&self) -> bool {
        match self.phase {
            Phase::Open => false,
            Phase::Closing { elapsed } => elapsed >= Duration::from_millis(self.menu.close_ms),
        }
    }

    /// Starts the exit animation exactly once; returns whether this call was
    /// the one that started it. Each button animates from wherever it
    /// currently is (a trigger may fire mid-entrance) back to the collapsed
    /// center rect and to opacity 0.
    pub fn begin_close(&mut self) -> bool {
        if self.is_closing() {
            return false;
        }
        self.phase = Phase::Closing {
            elapsed: Duration::ZERO,
        };
        self.hover = None;

        let duration = Duration::from_millis(self.menu.close_ms);
        for button in &mut self.buttons {
            let collapsed = Rect::centered_at(self.center, button.rect.width);
            button.geometry = Some(Tween::new(
                button.rect,
                collapsed,
                duration,
                self.menu.close_easing,
            ));
            button.fade = Some(Tween::new(
                button.opacity,
                0.0,
                duration,
                self.menu.close_easing,
            ));
        }
        true
    }

    /// Advances every running tween and the close clock by `dt`.
    pub fn tick(&mut self, dt: Duration) -> Tick {
        let mut moved = false;
        for button in &mut self.buttons {
            moved |= button.tick(dt);
        }

        let close = Duration::from_millis(self.menu.close_ms);
        let finished = match &mut self.phase {
            Phase::Open => false,
            Phase::Closing { elapsed } => {
                *elapsed = (*elapsed + dt).min(close);
                *elapsed >= close
            }
        };

        Tick {
            should_redraw: moved || finished,
            finished,
        }
    }

    /// Which button's circle, at its current animated position, contains `p`.
    pub fn hit_test(&self, p: Point) -> Option<usize> {
        self.buttons.iter().position(|b| b.contains(p))
    }

    /// Updates the hover highlight; returns whether a redraw is needed.
    pub fn update_cursor(&mut self, p: Point) -> bool {
        if self.is_closing() {
            return false;
        }
        let new_hover = self.hit_test(p);
        let changed = self.hover != new_hover;
        self.hover = new_hover;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Label;
    use crate::launch::CommandLine;
    use std::path::PathBuf;

    const DT: Duration = Duration::from_millis(10);

    fn item(label: &str, command: &str) -> MenuItem {
        MenuItem {
            label: Label::new(label),
            command: CommandLine::new(command),
            icon: PathBuf::new(),
        }
    }

    fn open_session(count: usize) -> Session {
        let items = (0..count).map(|i| item(&format!("app{i}"), "true")).collect();
        let mut session = Session::new(items, MenuConfig::default());
        session.open_at(Point::new(150.0, 150.0));
        session
    }

    fn run_for(session: &mut Session, total: Duration) -> Tick {
        let mut last = Tick::default();
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            last = session.tick(DT);
            elapsed += DT;
        }
        last
    }

    #[test]
    fn test_ring_targets_lie_on_circle() {
        let session = open_session(5);
        for i in 0..5 {
            let target = session.ring_target(i, 5);
            let center = target.center();
            let dist = center.distance(Point::new(150.0, 150.0));
            assert!((dist - 100.0).abs() < 1e-9, "button {i} off ring: {dist}");

            let angle = 2.0 * PI * i as f64 / 5.0;
            assert!((center.x - (150.0 + 100.0 * angle.cos())).abs() < 1e-9);
            assert!((center.y - (150.0 + 100.0 * angle.sin())).abs() < 1e-9);
        }
    }

    #[test]
    fn test_buttons_start_collapsed_and_transparent() {
        let session = open_session(5);
        for button in session.buttons() {
            assert_eq!(button.rect(), Rect::new(120.0, 120.0, 60.0, 60.0));
            assert_eq!(button.opacity(), 0.0);
        }
    }

    #[test]
    fn test_open_animation_reaches_ring_pose() {
        let mut session = open_session(5);
        run_for(&mut session, Duration::from_millis(500));
        for (i, button) in session.buttons().iter().enumerate() {
            let want = session.ring_target(i, 5).center();
            let got = button.rect().center();
            assert!(got.distance(want) < 1e-6, "button {i}: {got:?} vs {want:?}");
            assert!((button.opacity() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_opacity_monotonic_while_opening() {
        let mut session = open_session(3);
        let mut prev = 0.0;
        for _ in 0..50 {
            session.tick(DT);
            let now = session.buttons()[0].opacity();
            assert!(now >= prev - 1e-9, "opacity regressed: {prev} -> {now}");
            prev = now;
        }
    }

    #[test]
    fn test_opacity_monotonic_while_closing() {
        let mut session = open_session(3);
        run_for(&mut session, Duration::from_millis(500));
        assert!(session.begin_close());

        let mut prev = session.buttons()[0].opacity();
        for _ in 0..30 {
            session.tick(DT);
            let now = session.buttons()[0].opacity();
            assert!(now <= prev + 1e-9, "opacity rose while closing: {prev} -> {now}");
            prev = now;
        }
        assert!(session.buttons()[0].opacity() < 1e-9);
    }

    #[test]
    fn test_close_starts_from_in_flight_values() {
        let mut session = open_session(5);
        run_for(&mut session, Duration::from_millis(100));

        let mid_rect = session.buttons()[2].rect();
        let mid_opacity = session.buttons()[2].opacity();
        // Partially opened: neither collapsed nor at the ring.
        assert_ne!(mid_rect, Rect::new(120.0, 120.0, 60.0, 60.0));
        assert!(mid_rect.center().distance(session.ring_target(2, 5).center()) > 1.0);
        assert!(mid_opacity > 0.0 && mid_opacity < 1.0);

        // Starting the close does not snap anything; the exit tweens pick up
        // exactly where the entrance left off.
        assert!(session.begin_close());
        assert_eq!(session.buttons()[2].rect(), mid_rect);
        assert_eq!(session.buttons()[2].opacity(), mid_opacity);

        run_for(&mut session, Duration::from_millis(300));
        assert!(session.is_finished());
        let end = session.buttons()[2].rect();
        assert!(end.center().distance(Point::new(150.0, 150.0)) < 1e-6);
        assert!(session.buttons()[2].opacity() < 1e-9);
    }

    #[test]
    fn test_begin_close_is_idempotent() {
        let mut session = open_session(5);
        run_for(&mut session, Duration::from_millis(500));

        assert!(session.begin_close());
        run_for(&mut session, Duration::from_millis(100));
        let mid_rect = session.buttons()[0].rect();

        // A second trigger must not restart or re-aim the exit animation.
        assert!(!session.begin_close());
        assert_eq!(session.buttons()[0].rect(), mid_rect);

        run_for(&mut session, Duration::from_millis(200));
        assert!(session.is_finished());
        assert!(!session.begin_close());
    }

    #[test]
    fn test_close_finishes_after_close_duration() {
        let mut session = open_session(5);
        run_for(&mut session, Duration::from_millis(500));
        session.begin_close();

        run_for(&mut session, Duration::from_millis(290));
        assert!(!session.is_finished());
        session.tick(DT);
        assert!(session.is_finished());
    }

    #[test]
    fn test_empty_menu_still_dismisses() {
        let mut session = open_session(0);
        assert!(session.buttons().is_empty());
        assert!(session.begin_close());
        let last = run_for(&mut session, Duration::from_millis(300));
        assert!(last.finished);
    }

    #[test]
    fn test_hit_test_tracks_animated_position() {
        let mut session = open_session(5);

        // Mid-flight the ring pose is not yet reachable, but the collapsed
        // cluster near the center is.
        session.tick(DT);
        let ring_center = session.ring_target(0, 5).center();
        assert_eq!(session.hit_test(ring_center), None);
        assert!(session.hit_test(Point::new(150.0, 150.0)).is_some());

        run_for(&mut session, Duration::from_millis(500));
        assert_eq!(session.hit_test(ring_center), Some(0));
        // The center is empty once the buttons have flown out.
        assert_eq!(session.hit_test(Point::new(150.0, 150.0)), None);
    }

    #[test]
    fn test_hover_follows_cursor() {
        let mut session = open_session(5);
        run_for(&mut session, Duration::from_millis(500));

        let on_button = session.ring_target(3, 5).center();
        assert!(session.update_cursor(on_button));
        assert_eq!(session.hover(), Some(3));
        // No change, no redraw.
        assert!(!session.update_cursor(on_button));

        assert!(session.update_cursor(Point::new(150.0, 150.0)));
        assert_eq!(session.hover(), None);

        // Hover is dead while closing.
        session.begin_close();
        assert!(!session.update_cursor(on_button));
        assert_eq!(session.hover(), None);
    }

    #[test]
    fn test_bounds_centered_on_invocation_point() {
        let mut session = Session::new(Vec::new(), MenuConfig::default());
        session.open_at(Point::new(500.0, 400.0));
        let bounds = session.bounds();
        assert_eq!(bounds, Rect::new(350.0, 250.0, 300.0, 300.0));
        assert!(bounds.contains(Point::new(500.0, 400.0)));
        assert!(!bounds.contains(Point::new(650.1, 400.0)));
    }

    #[test]
    fn test_tick_goes_quiet_after_animations_finish() {
        let mut session = open_session(2);
        run_for(&mut session, Duration::from_millis(500));
        let tick = session.tick(DT);
        assert!(!tick.should_redraw);
        assert!(!tick.finished);
    }
}
