use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;

pub const MIN_INTERVAL_MS: u64 = 1000;
pub const MAX_INTERVAL_MS: u64 = 10000;
pub const DEFAULT_INTERVAL_MS: u64 = 3500;

/// Visual transition applied to a slide when it is shown. One is picked at
/// random per shown slide; repeats are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ZoomIn,
    ZoomOut,
    PanLeft,
    PanRight,
    Fade,
}

impl Effect {
    pub const ALL: [Effect; 5] = [
        Effect::ZoomIn,
        Effect::ZoomOut,
        Effect::PanLeft,
        Effect::PanRight,
        Effect::Fade,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Effect::ZoomIn => "zoom in",
            Effect::ZoomOut => "zoom out",
            Effect::PanLeft => "pan left",
            Effect::PanRight => "pan right",
            Effect::Fade => "fade",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Empty collection; never leaves this state.
    Idle,
    Playing,
    Paused,
}

/// Playback controller for the relive screen. Owns the display order, the
/// cursor and every toggle; holds entry indices only and never touches the
/// entries themselves.
pub struct Slideshow {
    len: usize,
    order: Vec<usize>,
    /// Position within `order`. -1 until the first slide is shown.
    cursor: isize,
    playback: Playback,
    shuffle: bool,
    loop_on: bool,
    /// 1 forward, -1 reverse.
    direction: isize,
    captions: bool,
    interval: Duration,
    effect: Effect,
    last_advance: Instant,
}

impl Slideshow {
    pub fn new(len: usize, now: Instant) -> Self {
        Slideshow {
            len,
            order: (0..len).collect(),
            cursor: -1,
            playback: if len == 0 { Playback::Idle } else { Playback::Paused },
            shuffle: false,
            loop_on: true,
            direction: 1,
            captions: true,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            effect: Effect::Fade,
            last_advance: now,
        }
    }

    /// Starts (or resumes) autoplay: shows the next slide immediately and
    /// restarts the timer phase.
    pub fn start(&mut self, now: Instant, rng: &mut impl Rng) {
        if self.playback == Playback::Idle {
            return;
        }
        self.playback = Playback::Playing;
        self.advance(rng);
        self.last_advance = now;
    }

    /// Pauses autoplay; the cursor stays where it is.
    pub fn stop(&mut self) {
        if self.playback == Playback::Playing {
            self.playback = Playback::Paused;
        }
    }

    /// Advances when a full interval has elapsed. With loop off, an advance
    /// that would wrap past the end of the display order pauses on the
    /// boundary slide instead; manual navigation is unaffected.
    pub fn tick(&mut self, now: Instant, rng: &mut impl Rng) -> bool {
        if self.playback != Playback::Playing {
            return false;
        }
        if now.duration_since(self.last_advance) < self.interval {
            return false;
        }
        if !self.loop_on && self.at_boundary() {
            self.playback = Playback::Paused;
            return false;
        }
        self.advance(rng);
        self.last_advance = now;
        true
    }

    pub fn next_manual(&mut self, now: Instant, rng: &mut impl Rng) {
        if self.len == 0 {
            return;
        }
        self.advance(rng);
        self.last_advance = now;
    }

    pub fn prev_manual(&mut self, now: Instant, rng: &mut impl Rng) {
        if self.len == 0 {
            return;
        }
        self.cursor = self.wrap(self.cursor - self.direction);
        self.effect = pick_effect(rng);
        self.last_advance = now;
    }

    /// Thumbnail jump: moves the cursor to the given entry's position in the
    /// display order and restarts the timer phase.
    pub fn jump(&mut self, entry_idx: usize, now: Instant, rng: &mut impl Rng) {
        if let Some(pos) = self.order.iter().position(|&i| i == entry_idx) {
            self.cursor = pos as isize;
            self.effect = pick_effect(rng);
            self.last_advance = now;
        }
    }

    /// Regenerates the display order (shuffled or identity) and shows the
    /// first slide of the new order; the previously visible entry's position
    /// is deliberately not preserved.
    pub fn toggle_shuffle(&mut self, rng: &mut impl Rng) {
        if self.len == 0 {
            return;
        }
        self.shuffle = !self.shuffle;
        if self.shuffle {
            self.order.shuffle(rng);
        } else {
            self.order = (0..self.len).collect();
        }
        self.cursor = -1;
        self.advance(rng);
    }

    pub fn toggle_loop(&mut self) {
        self.loop_on = !self.loop_on;
    }

    pub fn toggle_reverse(&mut self) {
        self.direction = -self.direction;
    }

    pub fn toggle_captions(&mut self) {
        self.captions = !self.captions;
    }

    /// Live interval change: the timer restarts at the new duration without
    /// moving the cursor.
    pub fn set_interval_ms(&mut self, ms: u64, now: Instant) {
        let ms = ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS);
        self.interval = Duration::from_millis(ms);
        self.last_advance = now;
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval.as_millis() as u64
    }

    /// Fraction of the current interval already elapsed, for the progress
    /// bar. Zero while not playing.
    pub fn phase(&self, now: Instant) -> f64 {
        if self.playback != Playback::Playing {
            return 0.0;
        }
        let elapsed = now.duration_since(self.last_advance).as_secs_f64();
        (elapsed / self.interval.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Entry index of the slide currently shown, if any slide has been shown.
    pub fn current_index(&self) -> Option<usize> {
        if self.cursor < 0 || self.cursor as usize >= self.len {
            return None;
        }
        Some(self.order[self.cursor as usize])
    }

    /// (1-based position in the display order, total), for the footer.
    pub fn position(&self) -> Option<(usize, usize)> {
        if self.cursor < 0 {
            return None;
        }
        Some((self.cursor as usize + 1, self.len))
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback == Playback::Playing
    }

    pub fn shuffle_on(&self) -> bool {
        self.shuffle
    }

    pub fn loop_on(&self) -> bool {
        self.loop_on
    }

    pub fn reversed(&self) -> bool {
        self.direction == -1
    }

    pub fn captions_on(&self) -> bool {
        self.captions
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    fn advance(&mut self, rng: &mut impl Rng) {
        self.cursor = self.wrap(self.cursor + self.direction);
        self.effect = pick_effect(rng);
    }

    fn wrap(&self, cursor: isize) -> isize {
        cursor.rem_euclid(self.len as isize)
    }

    /// True when the next automatic advance would wrap around the display
    /// order in the current direction.
    fn at_boundary(&self) -> bool {
        if self.cursor < 0 {
            return false;
        }
        if self.direction == 1 {
            self.cursor as usize == self.len - 1
        } else {
            self.cursor == 0
        }
    }
}

fn pick_effect(rng: &mut impl Rng) -> Effect {
    Effect::ALL.choose(rng).copied().unwrap_or(Effect::Fade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn interval() -> Duration {
        Duration::from_millis(DEFAULT_INTERVAL_MS)
    }

    #[test]
    fn empty_collection_is_idle_forever() {
        let t0 = Instant::now();
        let mut show = Slideshow::new(0, t0);
        assert_eq!(show.playback(), Playback::Idle);
        show.start(t0, &mut rng());
        assert_eq!(show.playback(), Playback::Idle);
        assert!(!show.tick(t0 + interval(), &mut rng()));
        assert_eq!(show.current_index(), None);
    }

    #[test]
    fn start_shows_the_first_slide_immediately() {
        let t0 = Instant::now();
        let mut show = Slideshow::new(3, t0);
        assert_eq!(show.current_index(), None);
        show.start(t0, &mut rng());
        assert!(show.is_playing());
        assert_eq!(show.current_index(), Some(0));
    }

    #[test]
    fn next_wraps_around_the_order() {
        let t0 = Instant::now();
        let mut r = rng();
        let mut show = Slideshow::new(3, t0);
        show.start(t0, &mut r);
        assert_eq!(show.current_index(), Some(0));
        let mut visited = Vec::new();
        for _ in 0..4 {
            show.next_manual(t0, &mut r);
            visited.push(show.current_index().unwrap());
        }
        assert_eq!(visited, vec![1, 2, 0, 1]);
    }

    #[test]
    fn reverse_flips_the_direction_of_travel() {
        let t0 = Instant::now();
        let mut r = rng();
        let mut show = Slideshow::new(3, t0);
        show.start(t0, &mut r);
        show.toggle_reverse();
        show.next_manual(t0, &mut r);
        assert_eq!(show.current_index(), Some(2));
        show.prev_manual(t0, &mut r);
        assert_eq!(show.current_index(), Some(0));
    }

    #[test]
    fn tick_advances_only_after_a_full_interval() {
        let t0 = Instant::now();
        let mut r = rng();
        let mut show = Slideshow::new(3, t0);
        show.start(t0, &mut r);
        assert!(!show.tick(t0 + interval() - Duration::from_millis(1), &mut r));
        assert_eq!(show.current_index(), Some(0));
        assert!(show.tick(t0 + interval(), &mut r));
        assert_eq!(show.current_index(), Some(1));
    }

    #[test]
    fn manual_navigation_resets_the_timer_phase() {
        let t0 = Instant::now();
        let mut r = rng();
        let mut show = Slideshow::new(5, t0);
        show.start(t0, &mut r);
        let t1 = t0 + Duration::from_millis(2000);
        show.next_manual(t1, &mut r);
        // Next automatic advance is a full interval after the manual one.
        assert!(!show.tick(t0 + interval(), &mut r));
        assert!(show.tick(t1 + interval(), &mut r));
    }

    #[test]
    fn interval_change_restarts_without_moving_the_cursor() {
        let t0 = Instant::now();
        let mut r = rng();
        let mut show = Slideshow::new(3, t0);
        show.start(t0, &mut r);
        let t1 = t0 + Duration::from_millis(3000);
        show.set_interval_ms(1000, t1);
        assert_eq!(show.current_index(), Some(0));
        assert!(!show.tick(t1 + Duration::from_millis(999), &mut r));
        assert!(show.tick(t1 + Duration::from_millis(1000), &mut r));
    }

    #[test]
    fn interval_is_clamped() {
        let t0 = Instant::now();
        let mut show = Slideshow::new(3, t0);
        show.set_interval_ms(1, t0);
        assert_eq!(show.interval_ms(), MIN_INTERVAL_MS);
        show.set_interval_ms(60000, t0);
        assert_eq!(show.interval_ms(), MAX_INTERVAL_MS);
    }

    #[test]
    fn pause_retains_position_and_resume_advances() {
        let t0 = Instant::now();
        let mut r = rng();
        let mut show = Slideshow::new(3, t0);
        show.start(t0, &mut r);
        show.stop();
        assert_eq!(show.playback(), Playback::Paused);
        assert_eq!(show.current_index(), Some(0));
        assert!(!show.tick(t0 + interval(), &mut r));
        show.start(t0, &mut r);
        assert_eq!(show.current_index(), Some(1));
    }

    #[test]
    fn loop_off_pauses_autoplay_at_the_boundary() {
        let t0 = Instant::now();
        let mut r = rng();
        let mut show = Slideshow::new(2, t0);
        show.start(t0, &mut r);
        show.toggle_loop();
        assert!(!show.loop_on());
        let t1 = t0 + interval();
        assert!(show.tick(t1, &mut r));
        assert_eq!(show.current_index(), Some(1));
        // At the end of the order: the next tick pauses instead of wrapping.
        assert!(!show.tick(t1 + interval(), &mut r));
        assert_eq!(show.playback(), Playback::Paused);
        assert_eq!(show.current_index(), Some(1));
        // Manual navigation still wraps unconditionally.
        show.next_manual(t1, &mut r);
        assert_eq!(show.current_index(), Some(0));
    }

    #[test]
    fn shuffle_toggle_restores_identity_order() {
        let t0 = Instant::now();
        let mut r = rng();
        let mut show = Slideshow::new(6, t0);
        show.start(t0, &mut r);
        show.toggle_shuffle(&mut r);
        assert!(show.shuffle_on());
        // Still a permutation of every entry index.
        let mut seen: Vec<usize> = (0..6)
            .map(|_| {
                let idx = show.current_index().unwrap();
                show.next_manual(t0, &mut r);
                idx
            })
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..6).collect::<Vec<_>>());
        show.toggle_shuffle(&mut r);
        assert!(!show.shuffle_on());
        assert_eq!(show.current_index(), Some(0));
    }

    #[test]
    fn jump_lands_on_the_requested_entry() {
        let t0 = Instant::now();
        let mut r = rng();
        let mut show = Slideshow::new(4, t0);
        show.start(t0, &mut r);
        show.jump(2, t0, &mut r);
        assert_eq!(show.current_index(), Some(2));
        show.jump(99, t0, &mut r);
        assert_eq!(show.current_index(), Some(2));
    }

    #[test]
    fn captions_toggle_is_independent_of_playback() {
        let t0 = Instant::now();
        let mut show = Slideshow::new(2, t0);
        assert!(show.captions_on());
        show.toggle_captions();
        assert!(!show.captions_on());
        assert_eq!(show.playback(), Playback::Paused);
    }
}
