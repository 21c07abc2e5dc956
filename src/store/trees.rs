pub const QUEUE_STATE: &str = "queue_state";
