use super::{MathError, Matrix4};

/// A stack of transforms where [`push`](MatrixStack::push) duplicates the
/// current top so that nested transforms can be applied and undone.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: Vec<Matrix4>,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStack {
    /// Creates a stack holding a single identity matrix.
    pub fn new() -> Self {
        Self {
            stack: vec![Matrix4::IDENTITY],
        }
    }

    /// Drops everything and starts over from a single identity matrix.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.stack.push(Matrix4::IDENTITY);
    }

    pub fn top(&self) -> &Matrix4 {
        // never empty: `pop` refuses to remove the bottom matrix
        &self.stack[self.stack.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut Matrix4 {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub fn set_top(&mut self, m: Matrix4) {
        *self.top_mut() = m;
    }

    /// Post-multiplies the top by `m`.
    pub fn apply(&mut self, m: Matrix4) {
        *self.top_mut() *= m;
    }

    pub fn push(&mut self) {
        let top = *self.top();
        self.stack.push(top);
    }

    pub fn pop(&mut self) -> Result<(), MathError> {
        if self.stack.len() == 1 {
            return Err(MathError::StackUnderflow);
        }
        self.stack.pop();
        Ok(())
    }

    /// Number of pushes not yet popped.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }
}
