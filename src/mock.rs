/*!
 * In-memory collaborators for testing and headless hosts.
 *
 * - `MockPlayer` - a playback source whose position the caller drives
 * - `MockContainer` - a small node tree with attributes, classes and visibility
 * - `ManualClock` - a clock that only moves when told to
 *
 * Signals are dispatched after the listener list lock is released, so a
 * handler may add or remove listeners while it runs.
 */

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::content::{ClickHandler, ContentContainer, ElementRef, ScrollOptions};
use crate::playback::{PlaybackSignal, PlaybackSource, SignalHandler};

#[derive(Debug, Default)]
struct PlayerState {
    current_time: f64,
    paused: bool,
    seeks: Vec<f64>,
    play_calls: usize,
}

/// Playback source driven by the test
pub struct MockPlayer {
    state: Mutex<PlayerState>,
    listeners: Mutex<Vec<(PlaybackSignal, SignalHandler)>>,
}

impl MockPlayer {
    /// A paused player at position zero
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PlayerState {
                paused: true,
                ..Default::default()
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// A player that is already playing
    pub fn playing() -> Self {
        let player = Self::new();
        player.state.lock().paused = false;
        player
    }

    /// Move the position as playback would and emit `TimeUpdate`
    pub fn advance_to(&self, seconds: f64) {
        self.state.lock().current_time = seconds;
        self.emit(PlaybackSignal::TimeUpdate);
    }

    /// Emit `Ended`, pausing the player like a media element does
    pub fn finish(&self) {
        self.state.lock().paused = true;
        self.emit(PlaybackSignal::Ended);
    }

    pub fn pause(&self) {
        self.state.lock().paused = true;
    }

    /// Invoke every handler attached for `signal`
    pub fn emit(&self, signal: PlaybackSignal) {
        let handlers: Vec<SignalHandler> = self
            .listeners
            .lock()
            .iter()
            .filter(|(s, _)| *s == signal)
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in handlers {
            handler();
        }
    }

    /// Positions requested through `set_current_time`, in order
    pub fn seeks(&self) -> Vec<f64> {
        self.state.lock().seeks.clone()
    }

    pub fn play_calls(&self) -> usize {
        self.state.lock().play_calls
    }

    pub fn listener_count(&self, signal: PlaybackSignal) -> usize {
        self.listeners.lock().iter().filter(|(s, _)| *s == signal).count()
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl Default for MockPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSource for MockPlayer {
    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        let mut state = self.state.lock();
        state.current_time = seconds;
        state.seeks.push(seconds);
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn play(&self) {
        let mut state = self.state.lock();
        state.paused = false;
        state.play_calls += 1;
    }

    fn add_listener(&self, signal: PlaybackSignal, handler: SignalHandler) {
        self.listeners.lock().push((signal, handler));
    }

    fn remove_listener(&self, signal: PlaybackSignal, handler: &SignalHandler) {
        self.listeners
            .lock()
            .retain(|(s, h)| !(*s == signal && Arc::ptr_eq(h, handler)));
    }
}

#[derive(Debug, Default)]
struct Node {
    parent: Option<ElementRef>,
    attributes: HashMap<String, String>,
    classes: HashSet<String>,
    visible: bool,
}

#[derive(Default)]
struct ContainerState {
    nodes: Vec<Node>,
    scrolls: Vec<(ElementRef, ScrollOptions)>,
}

/// Node tree standing in for rendered chapter content
#[derive(Default)]
pub struct MockContainer {
    state: Mutex<ContainerState>,
    click_listeners: Mutex<Vec<ClickHandler>>,
}

impl MockContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// One off-screen node per id, with `attribute="<prefix><id>"`
    pub fn with_sentences(attribute: &str, prefix: &str, ids: &[&str]) -> Self {
        let container = Self::new();
        for id in ids {
            let value = format!("{}{}", prefix, id);
            container.add_node(None, &[(attribute, value.as_str())]);
        }
        container
    }

    /// Append a node and return its handle
    pub fn add_node(&self, parent: Option<ElementRef>, attributes: &[(&str, &str)]) -> ElementRef {
        let mut state = self.state.lock();
        let element = ElementRef(state.nodes.len());
        state.nodes.push(Node {
            parent,
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        });
        element
    }

    pub fn set_visible(&self, element: ElementRef, visible: bool) {
        if let Some(node) = self.state.lock().nodes.get_mut(element.0) {
            node.visible = visible;
        }
    }

    /// Nodes currently carrying `class`
    pub fn elements_with_class(&self, class: &str) -> Vec<ElementRef> {
        self.state
            .lock()
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.classes.contains(class))
            .map(|(i, _)| ElementRef(i))
            .collect()
    }

    /// Scroll requests received so far
    pub fn scrolls(&self) -> Vec<(ElementRef, ScrollOptions)> {
        self.state.lock().scrolls.clone()
    }

    /// Dispatch a click on `target` to every click listener
    pub fn click(&self, target: ElementRef) {
        let handlers: Vec<ClickHandler> = self.click_listeners.lock().clone();
        for handler in handlers {
            handler(target);
        }
    }

    pub fn click_listener_count(&self) -> usize {
        self.click_listeners.lock().len()
    }
}

impl ContentContainer for MockContainer {
    fn query_by_attribute(&self, name: &str, value: &str) -> Option<ElementRef> {
        self.state
            .lock()
            .nodes
            .iter()
            .position(|node| node.attributes.get(name).is_some_and(|v| v == value))
            .map(ElementRef)
    }

    fn closest_with_attribute(&self, from: ElementRef, name: &str) -> Option<ElementRef> {
        let state = self.state.lock();
        let mut cursor = Some(from);
        while let Some(element) = cursor {
            let node = state.nodes.get(element.0)?;
            if node.attributes.contains_key(name) {
                return Some(element);
            }
            cursor = node.parent;
        }
        None
    }

    fn attribute(&self, element: ElementRef, name: &str) -> Option<String> {
        self.state
            .lock()
            .nodes
            .get(element.0)
            .and_then(|node| node.attributes.get(name).cloned())
    }

    fn add_class(&self, element: ElementRef, class: &str) {
        if let Some(node) = self.state.lock().nodes.get_mut(element.0) {
            node.classes.insert(class.to_string());
        }
    }

    fn remove_class(&self, element: ElementRef, class: &str) {
        if let Some(node) = self.state.lock().nodes.get_mut(element.0) {
            node.classes.remove(class);
        }
    }

    fn has_class(&self, element: ElementRef, class: &str) -> bool {
        self.state
            .lock()
            .nodes
            .get(element.0)
            .is_some_and(|node| node.classes.contains(class))
    }

    fn is_in_view(&self, element: ElementRef) -> bool {
        self.state
            .lock()
            .nodes
            .get(element.0)
            .is_some_and(|node| node.visible)
    }

    fn scroll_into_view(&self, element: ElementRef, options: ScrollOptions) {
        self.state.lock().scrolls.push((element, options));
    }

    fn add_click_listener(&self, handler: ClickHandler) {
        self.click_listeners.lock().push(handler);
    }

    fn remove_click_listener(&self, handler: &ClickHandler) {
        self.click_listeners.lock().retain(|h| !Arc::ptr_eq(h, handler));
    }
}

/// Clock advanced explicitly by the test
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
