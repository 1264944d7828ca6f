// src/pipeline.rs
use crate::stage::{Stage, StageError};
use std::borrow::Cow;
use std::sync::Arc;

pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn process<'a>(&self, text: Cow<'a, str>) -> Result<Cow<'a, str>, StageError> {
        let mut current = text;

        for stage in &self.stages {
            // Fast path: skip if no mutation needed
            if !stage.needs_apply(&current)? {
                continue;
            }

            current = stage.apply(current)?;
        }

        Ok(current)
    }
}
