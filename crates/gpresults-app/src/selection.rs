// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

use crate::ViewKey;

pub type SelectionHandler = Box<dyn FnMut(Option<ViewKey>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct SelectionChannel {
    current: Option<ViewKey>,
    subscribers: Vec<(SubscriptionId, SelectionHandler)>,
    next_id: u64,
}

impl fmt::Debug for SelectionChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionChannel")
            .field("current", &self.current)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl SelectionChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ViewKey> {
        self.current
    }

    pub fn set_active(&mut self, key: ViewKey) -> Option<ViewKey> {
        let previous = self.current.replace(key);
        self.notify();
        previous
    }

    pub fn reset(&mut self) -> Option<ViewKey> {
        let previous = self.current.take();
        self.notify();
        previous
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(Option<ViewKey>) + 'static,
    {
        self.next_id = self.next_id.saturating_add(1);
        let id = SubscriptionId(self.next_id);
        let mut handler: SelectionHandler = Box::new(handler);
        handler(self.current);
        self.subscribers.push((id, handler));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        let current = self.current;
        for (_, handler) in &mut self.subscribers {
            handler(current);
        }
    }
}
