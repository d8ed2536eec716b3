//! The value stack shared by the whole call tree.
//!
//! Reading past the bottom of the stack is an evaluator bug and panics.

use crate::core::Value;

pub struct ValueStack {
    values: Vec<Value>,
    alloc_step: usize,
}

impl ValueStack {
    pub fn new(alloc_step: usize) -> Self {
        let alloc_step = alloc_step.max(1);
        Self {
            values: Vec::with_capacity(alloc_step),
            alloc_step,
        }
    }

    #[inline]
    pub fn push(&mut self, value: Value) {
        if self.values.len() == self.values.capacity() {
            self.values.reserve_exact(self.alloc_step);
        }
        self.values.push(value);
    }

    #[inline]
    pub fn pop(&mut self) -> Value {
        match self.values.pop() {
            Some(v) => v,
            None => panic!("value stack underflow"),
        }
    }

    /// Read the value `index` slots below the top (0 is the top).
    #[inline]
    pub fn peek(&self, index: usize) -> Value {
        let len = self.values.len();
        assert!(index < len, "value stack underflow: peek({index}) at height {len}");
        self.values[len - 1 - index]
    }

    #[inline]
    pub fn replace_top(&mut self, value: Value) {
        match self.values.last_mut() {
            Some(top) => *top = value,
            None => panic!("value stack underflow"),
        }
    }

    /// Drop the top `n` values.
    #[inline]
    pub fn shrink(&mut self, n: usize) {
        let len = self.values.len();
        assert!(n <= len, "value stack underflow: shrink({n}) at height {len}");
        self.values.truncate(len - n);
    }

    /// Restore a height recorded earlier.
    pub fn truncate(&mut self, height: usize) {
        self.values.truncate(height);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The top `n` values, bottom first.
    pub fn top(&self, n: usize) -> &[Value] {
        let len = self.values.len();
        assert!(n <= len, "value stack underflow: top({n}) at height {len}");
        &self.values[len - n..]
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_counts_from_the_top() {
        let mut stack = ValueStack::new(2);
        stack.push(Value::Int(1));
        stack.push(Value::Int(2));
        stack.push(Value::Int(3));
        assert_eq!(stack.peek(0), Value::Int(3));
        assert_eq!(stack.peek(2), Value::Int(1));
        stack.shrink(2);
        assert_eq!(stack.pop(), Value::Int(1));
        assert!(stack.is_empty());
    }

    #[test]
    #[should_panic(expected = "value stack underflow")]
    fn pop_on_empty_stack_panics() {
        let mut stack = ValueStack::new(4);
        stack.pop();
    }

    #[test]
    #[should_panic(expected = "value stack underflow")]
    fn peek_past_bottom_panics() {
        let mut stack = ValueStack::new(4);
        stack.push(Value::Null);
        stack.peek(1);
    }
}
