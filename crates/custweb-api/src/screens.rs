//! Registry of open transaction screens
//!
//! Every opened transaction page owns one synchronizer and one frame buffer.
//! The registry holds at most `max_open` screens and evicts the oldest when
//! a new one is opened.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use custweb_core::{Customer, FrameBuffer, TransactionViewSync};

/// One open transaction screen
pub struct Screen {
    pub id: String,
    pub customer: Customer,
    pub sync: Arc<TransactionViewSync>,
    pub frames: Arc<FrameBuffer>,
}

pub struct ScreenRegistry {
    screens: HashMap<String, Arc<Screen>>,
    order: VecDeque<String>,
    max_open: usize,
}

impl ScreenRegistry {
    pub fn new(max_open: usize) -> Self {
        Self {
            screens: HashMap::new(),
            order: VecDeque::new(),
            max_open: max_open.max(1),
        }
    }

    /// Register a screen; returns it along with the id of an evicted screen
    pub fn insert(&mut self, screen: Screen) -> (Arc<Screen>, Option<String>) {
        let mut evicted = None;
        if self.screens.len() >= self.max_open {
            if let Some(oldest) = self.order.pop_front() {
                self.screens.remove(&oldest);
                log::debug!(target: "custweb::api", "Evicted screen {}", oldest);
                evicted = Some(oldest);
            }
        }

        let screen = Arc::new(screen);
        self.order.push_back(screen.id.clone());
        self.screens.insert(screen.id.clone(), Arc::clone(&screen));
        (screen, evicted)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Screen>> {
        self.screens.get(id).cloned()
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<Screen>> {
        let removed = self.screens.remove(id)?;
        self.order.retain(|open| open != id);
        Some(removed)
    }

    /// Ids of open screens, oldest first
    pub fn ids(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }
}
