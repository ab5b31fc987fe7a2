//! WGSL sources for each pass, plus up-front validation with naga.
//!
//! Every pass shares the fullscreen-quad vertex stage in `quad.wgsl`.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::backend::ShaderPass;
use crate::error::{PostError, PostResult};

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

pub fn source(pass: ShaderPass) -> &'static str {
    match pass {
        ShaderPass::Passthrough => concat!(
            include_str!("shaders/quad.wgsl"),
            include_str!("shaders/passthrough.wgsl")
        ),
        ShaderPass::Threshold => concat!(
            include_str!("shaders/quad.wgsl"),
            include_str!("shaders/threshold.wgsl")
        ),
        ShaderPass::Blur => concat!(
            include_str!("shaders/quad.wgsl"),
            include_str!("shaders/blur.wgsl")
        ),
        ShaderPass::Combine => concat!(
            include_str!("shaders/quad.wgsl"),
            include_str!("shaders/combine.wgsl")
        ),
        ShaderPass::Final => concat!(
            include_str!("shaders/quad.wgsl"),
            include_str!("shaders/final.wgsl")
        ),
    }
}

/// Parse and validate `source`.
///
/// wgpu reports shader errors through its uncaptured-error handler, which
/// panics by default; checking first turns a bad shader into a recoverable
/// error.
pub fn validate_source(pass: ShaderPass, source: &str) -> PostResult<()> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| PostError::ShaderCompile {
        pass: pass.name(),
        message: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| PostError::ShaderCompile {
            pass: pass.name(),
            message: e.into_inner().to_string(),
        })?;

    Ok(())
}

pub fn validate(pass: ShaderPass) -> PostResult<()> {
    validate_source(pass, source(pass))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_shaders_validate() {
        for pass in ShaderPass::ALL {
            if let Err(e) = validate(pass) {
                panic!("{}", e);
            }
        }
    }

    #[test]
    fn test_every_pass_has_both_stages() {
        for pass in ShaderPass::ALL {
            let src = source(pass);
            assert!(src.contains(&format!("fn {}", VERTEX_ENTRY)));
            assert!(src.contains(&format!("fn {}", FRAGMENT_ENTRY)));
        }
    }

    #[test]
    fn test_broken_shader_is_reported() {
        let err = validate_source(ShaderPass::Blur, "fn fs_main( {").unwrap_err();
        match err {
            PostError::ShaderCompile { pass, .. } => assert_eq!(pass, "blur"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_only_the_presenting_pass_decodes_srgb() {
        for pass in ShaderPass::ALL {
            let decodes = source(pass).contains("srgb_to_linear(graded.rgb)");
            assert_eq!(decodes, pass.presents(), "{}", pass.name());
        }
    }

    #[test]
    fn test_blur_weights_sum_to_one() {
        let weights = [0.227027f32, 0.1945946, 0.1216216, 0.054054, 0.016216];
        let total = weights[0] + 2.0 * weights[1..].iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-5);
        let src = source(ShaderPass::Blur);
        for w in weights {
            assert!(src.contains(&w.to_string()));
        }
    }
}
