use super::*;

#[test]
fn test_display_backend_error() {
    let e = Error::BackendError("vkQueueSubmit failed".to_string());
    assert_eq!(e.to_string(), "Backend error: vkQueueSubmit failed");
}

#[test]
fn test_display_out_of_memory() {
    assert_eq!(Error::OutOfMemory.to_string(), "Out of GPU memory");
}

#[test]
fn test_display_invalid_resource() {
    let e = Error::InvalidResource("mesh id 42 out of range".to_string());
    assert_eq!(e.to_string(), "Invalid resource: mesh id 42 out of range");
}

#[test]
fn test_display_initialization_failed() {
    let e = Error::InitializationFailed("no Vulkan-capable GPU".to_string());
    assert_eq!(e.to_string(), "Initialization failed: no Vulkan-capable GPU");
}

#[test]
fn test_soft_errors() {
    assert!(Error::SwapchainOutOfDate.is_soft());
    assert!(Error::AssetNotReady.is_soft());
    assert!(!Error::OutOfMemory.is_soft());
    assert!(!Error::BackendError("x".to_string()).is_soft());
    assert!(!Error::InitializationFailed("x".to_string()).is_soft());
}

#[test]
fn test_error_is_std_error() {
    fn assert_std_error<T: std::error::Error>() {}
    assert_std_error::<Error>();
}

#[test]
fn test_result_alias() {
    fn returns_soft() -> Result<u32> {
        Err(Error::AssetNotReady)
    }
    assert_eq!(returns_soft(), Err(Error::AssetNotReady));
}
