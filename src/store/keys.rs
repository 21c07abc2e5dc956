/// 队列状态键；`namespace` 为空时直接使用基础键，否则按学习者区分
pub fn queue_state_key(base_key: &str, namespace: &str) -> String {
    if namespace.is_empty() {
        base_key.to_string()
    } else {
        format!("{}:{}", base_key, namespace)
    }
}
