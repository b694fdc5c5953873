//! Scope chain for variable bindings
//!
//! Frames are pushed for function calls, `for` loops and free-standing blocks.
//! Frame 0 is the global frame and is never popped.
//!
//! Lookups search from the innermost frame outward. Writes always land in the
//! innermost frame: assigning to a name that only exists in an outer frame
//! creates a new binding that shadows it until the frame is popped.

use super::value::Value;
use rustc_hash::FxHashMap;

/// One frame of bindings
pub type Frame = FxHashMap<String, Value>;

/// Stack of frames, innermost last
#[derive(Debug, Clone)]
pub struct ScopeChain {
    frames: Vec<Frame>,
}

impl ScopeChain {
    pub fn new() -> Self {
        ScopeChain {
            frames: vec![Frame::default()],
        }
    }

    /// Enter a new innermost frame
    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Leave the innermost frame. The global frame stays.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Look a name up, innermost frame first
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Bind `name` in the innermost frame
    pub fn set(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }

    pub fn globals(&self) -> &Frame {
        &self.frames[0]
    }

    /// Number of frames, counting the global one
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_searches_outward() {
        let mut scopes = ScopeChain::new();
        scopes.set("x", Value::Int(1));
        scopes.push_frame();
        assert_eq!(scopes.get("x"), Some(&Value::Int(1)));
        assert_eq!(scopes.get("y"), None);
    }

    #[test]
    fn test_write_shadows_outer_binding() {
        let mut scopes = ScopeChain::new();
        scopes.set("x", Value::Int(1));

        scopes.push_frame();
        scopes.set("x", Value::Int(2));
        assert_eq!(scopes.get("x"), Some(&Value::Int(2)));
        scopes.pop_frame();

        assert_eq!(scopes.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_global_frame_is_permanent() {
        let mut scopes = ScopeChain::new();
        scopes.set("g", Value::Int(5));
        assert!(scopes.pop_frame().is_none());
        assert_eq!(scopes.depth(), 1);
        assert_eq!(scopes.globals().get("g"), Some(&Value::Int(5)));
    }
}
