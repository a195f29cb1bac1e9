// src/notify.rs
// Ball-called notifications: the draw step broadcasts each ball to whoever is
// listening, without knowing who that is.

use crate::defs::Number;

use std::cell::RefCell;
use std::rc::Rc;

/// Something that reacts when a ball is called.
pub trait BallListener {
    fn on_ball_called(&mut self, ball: Number);
}

/// Shared handle to a listener. Identity is the allocation, not the value.
pub type ListenerHandle<L> = Rc<RefCell<L>>;

/// Ordered set of listeners notified synchronously, in attachment order.
///
/// `notify` walks a snapshot of the list, so a callback may attach or detach
/// listeners on the same channel; the change takes effect from the next ball.
pub struct BallChannel<L: ?Sized + BallListener> {
    listeners: RefCell<Vec<ListenerHandle<L>>>,
}

impl<L: ?Sized + BallListener> BallChannel<L> {
    pub fn new() -> Self {
        BallChannel {
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Returns false if the listener was already attached.
    pub fn attach(&self, listener: &ListenerHandle<L>) -> bool {
        if self.is_attached(listener) {
            return false;
        }
        self.listeners.borrow_mut().push(Rc::clone(listener));
        true
    }

    /// Returns false if the listener was not attached.
    pub fn detach(&self, listener: &ListenerHandle<L>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|attached| Rc::ptr_eq(attached, listener)) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self, listener: &ListenerHandle<L>) -> bool {
        self.listeners
            .borrow()
            .iter()
            .any(|attached| Rc::ptr_eq(attached, listener))
    }

    pub fn notify(&self, ball: Number) {
        let snapshot: Vec<ListenerHandle<L>> = self.listeners.borrow().clone();
        for listener in snapshot {
            listener.borrow_mut().on_ball_called(ball);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }
}

impl<L: ?Sized + BallListener> Default for BallChannel<L> {
    fn default() -> Self {
        Self::new()
    }
}
