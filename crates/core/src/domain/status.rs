use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineStatus {
    Down,
    Unavailable { reason: String },
    Up { ping_ms: f64 },
}

impl EngineStatus {
    pub fn code(&self) -> i8 {
        match self {
            EngineStatus::Up { .. } => 1,
            EngineStatus::Down | EngineStatus::Unavailable { .. } => -1,
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, EngineStatus::Up { .. })
    }

    pub fn message(&self) -> String {
        match self {
            EngineStatus::Down => "Down. Maybe not started?".to_string(),
            EngineStatus::Unavailable { reason } => reason.clone(),
            EngineStatus::Up { ping_ms } => format!("Up and running (Ping time: {ping_ms} ms)"),
        }
    }
}
