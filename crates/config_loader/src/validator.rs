//! 配置校验模块
//!
//! 校验规则：
//! - camera.width / camera.height > 0
//! - camera.fps (若给出) 为有限正数
//! - sync.pairing.tolerance_ms 为有限正数
//! - mask.trapezoid 参数为正，高度不超过 1
//! - mask.image_path (若给出) 非空

use contracts::{ContractError, SettingsBlueprint};

/// 校验 SettingsBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &SettingsBlueprint) -> Result<(), ContractError> {
    validate_camera(blueprint)?;
    validate_pairing(blueprint)?;
    validate_mask(blueprint)?;
    Ok(())
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// 校验相机设置
fn validate_camera(blueprint: &SettingsBlueprint) -> Result<(), ContractError> {
    let camera = &blueprint.camera;
    if camera.width == 0 || camera.height == 0 {
        return Err(ContractError::settings_validation(
            "camera.width / camera.height",
            format!(
                "resolution must be > 0, got {}x{}",
                camera.width, camera.height
            ),
        ));
    }

    if let Some(fps) = camera.fps {
        if !positive(fps) {
            return Err(ContractError::settings_validation(
                "camera.fps",
                format!("fps must be > 0, got {fps}"),
            ));
        }
    }
    Ok(())
}

/// 校验配对容差
fn validate_pairing(blueprint: &SettingsBlueprint) -> Result<(), ContractError> {
    let tolerance = blueprint.sync.pairing.tolerance_ms;
    if !positive(tolerance) {
        return Err(ContractError::settings_validation(
            "sync.pairing.tolerance_ms",
            format!("tolerance_ms must be > 0, got {tolerance}"),
        ));
    }
    Ok(())
}

/// 校验遮罩配置
fn validate_mask(blueprint: &SettingsBlueprint) -> Result<(), ContractError> {
    let mask = &blueprint.mask;
    if mask
        .image_path
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        return Err(ContractError::settings_validation(
            "mask.image_path",
            "image_path cannot be empty",
        ));
    }

    let t = &mask.trapezoid;
    for (field, value) in [
        ("mask.trapezoid.height", t.height),
        ("mask.trapezoid.top_width", t.top_width),
        ("mask.trapezoid.bottom_width", t.bottom_width),
    ] {
        if !positive(value) {
            return Err(ContractError::settings_validation(
                field,
                format!("must be > 0, got {value}"),
            ));
        }
    }
    if t.height > 1.0 {
        return Err(ContractError::settings_validation(
            "mask.trapezoid.height",
            format!("height is a fraction of the image and must be <= 1, got {}", t.height),
        ));
    }
    Ok(())
}
