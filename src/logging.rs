// Macros file - tracing macros are referenced by full path inside the definitions

/// Standardized logging macros so every layer emits the same field names.
///
/// API handlers use `log_api_*`, services use `log_service_*`, storage
/// backends use `log_store_operation!`.

// ============================================================================
// API Operation Logging Macros
// ============================================================================

/// Log the start of an API operation
#[macro_export]
macro_rules! log_api_start {
    ($operation:expr, resource_id = $id:expr) => {
        tracing::debug!(
            operation = $operation,
            resource_id = %$id,
            "API operation started"
        );
    };
    ($operation:expr) => {
        tracing::debug!(
            operation = $operation,
            "API operation started"
        );
    };
}

/// Log successful completion of an API operation
#[macro_export]
macro_rules! log_api_success {
    ($operation:expr, resource_id = $id:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            resource_id = %$id,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, count = $count:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            count = $count,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            "API operation completed: {}", $msg
        );
    };
}

/// Log API warnings with context
#[macro_export]
macro_rules! log_api_warn {
    ($operation:expr, resource_id = $id:expr, $msg:expr) => {
        tracing::warn!(
            operation = $operation,
            resource_id = %$id,
            "API operation warning: {}", $msg
        );
    };
    ($operation:expr, $msg:expr) => {
        tracing::warn!(
            operation = $operation,
            "API operation warning: {}", $msg
        );
    };
}

// ============================================================================
// Service Layer Logging Macros
// ============================================================================

#[macro_export]
macro_rules! log_service_start {
    ($service:expr, $operation:expr, resource_id = $id:expr) => {
        tracing::debug!(
            service = $service,
            operation = $operation,
            resource_id = %$id,
            "Service operation started"
        );
    };
    ($service:expr, $operation:expr) => {
        tracing::debug!(
            service = $service,
            operation = $operation,
            "Service operation started"
        );
    };
}

#[macro_export]
macro_rules! log_service_success {
    ($service:expr, $operation:expr, resource_id = $id:expr, $msg:expr) => {
        tracing::info!(
            service = $service,
            operation = $operation,
            resource_id = %$id,
            "Service operation completed: {}", $msg
        );
    };
    ($service:expr, $operation:expr, count = $count:expr, $msg:expr) => {
        tracing::info!(
            service = $service,
            operation = $operation,
            count = $count,
            "Service operation completed: {}", $msg
        );
    };
    ($service:expr, $operation:expr, $msg:expr) => {
        tracing::info!(
            service = $service,
            operation = $operation,
            "Service operation completed: {}", $msg
        );
    };
}

#[macro_export]
macro_rules! log_service_error {
    ($service:expr, $operation:expr, resource_id = $id:expr, error = $error:expr) => {
        tracing::error!(
            service = $service,
            operation = $operation,
            resource_id = %$id,
            error = %$error,
            "Service operation failed"
        );
    };
    ($service:expr, $operation:expr, error = $error:expr) => {
        tracing::error!(
            service = $service,
            operation = $operation,
            error = %$error,
            "Service operation failed"
        );
    };
}

#[macro_export]
macro_rules! log_service_warn {
    ($service:expr, $operation:expr, $msg:expr) => {
        tracing::warn!(
            service = $service,
            operation = $operation,
            "Service warning: {}",
            $msg
        );
    };
}

// ============================================================================
// Storage Operation Logging Macros
// ============================================================================

/// Log key-value store operations
#[macro_export]
macro_rules! log_store_operation {
    (debug, $operation:expr, key = $key:expr) => {
        tracing::debug!(
            component = "storage",
            operation = $operation,
            key = %$key,
            "Storage operation completed"
        );
    };
    (debug, $operation:expr, count = $count:expr) => {
        tracing::debug!(
            component = "storage",
            operation = $operation,
            result_count = $count,
            "Storage operation completed"
        );
    };
    (info, $operation:expr, $msg:expr) => {
        tracing::info!(
            component = "storage",
            operation = $operation,
            "Storage operation: {}", $msg
        );
    };
    (warn, $operation:expr, key = $key:expr, error = $error:expr) => {
        tracing::warn!(
            component = "storage",
            operation = $operation,
            key = %$key,
            error = %$error,
            "Storage value could not be decoded, using fallback"
        );
    };
    (error, $operation:expr, error = $error:expr) => {
        tracing::error!(
            component = "storage",
            operation = $operation,
            error = %$error,
            "Storage operation failed"
        );
    };
}

// ============================================================================
// System Event Logging Macros
// ============================================================================

#[macro_export]
macro_rules! log_system_event {
    (startup, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "startup",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (shutdown, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "shutdown",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (config, $msg:expr) => {
        tracing::info!(event_type = "configuration", "System event: {}", $msg);
    };
}

// ============================================================================
// Validation Logging Macros
// ============================================================================

#[macro_export]
macro_rules! log_validation {
    (success, $component:expr, $msg:expr) => {
        tracing::debug!(
            event_type = "validation",
            component = $component,
            result = "success",
            "Validation completed: {}", $msg
        );
    };
    (failure, $component:expr, error = $error:expr) => {
        tracing::warn!(
            event_type = "validation",
            component = $component,
            result = "failure",
            error = %$error,
            "Validation failed"
        );
    };
}
