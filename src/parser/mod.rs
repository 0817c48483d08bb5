//! Text scanning for Terraform/OpenTofu files.
//!
//! The hooks do not build a syntax tree for whole files. They locate block
//! headers with regular expressions and find block ends by brace matching on
//! a masked copy of the source, which keeps them working on files that are
//! mid-edit or use syntax newer than any parser we ship.
//!
//! # Building blocks
//!
//! - [`MaskedSource`]: the file text plus comment and string masks
//! - [`find_matching_brace`]: brace-depth matching with an explicit not-found result
//! - [`resource_headers`], [`module_headers`], [`provider_headers`],
//!   [`variable_headers`], [`output_headers`]: header lookup
//! - [`normalize_source`], [`extract_git_ref`]: module source helpers
//!
//! # Example
//!
//! ```rust
//! use tfhooks::parser::{resource_headers, MaskedSource};
//!
//! let content = "resource \"aws_vpc\" \"main\" {\n  cidr_block = \"10.0.0.0/16\"\n}\n";
//! let src = MaskedSource::new(content);
//! let headers = resource_headers(&src);
//! assert_eq!(headers[0].label(0), "aws_vpc");
//!
//! let (_, close) = src.block_from(headers[0].start).unwrap();
//! assert_eq!(close, content.len() - 2);
//! ```

mod blocks;
mod scan;
mod source;

pub use blocks::{
    module_headers, output_headers, provider_headers, resource_headers, variable_headers, BlockHeader,
};
pub use scan::{find_matching_brace, line_number_at, mask, MaskMode, MaskedSource};
pub use source::{extract_git_ref, is_local_path, normalize_source};

use std::path::Path;

/// File extension checked by every hook.
pub const TERRAFORM_EXTENSION: &str = "tf";

/// Check if a file is a Terraform/OpenTofu source file.
#[must_use]
pub fn is_terraform_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(TERRAFORM_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terraform_file() {
        assert!(is_terraform_file(Path::new("main.tf")));
        assert!(is_terraform_file(Path::new("modules/vpc/variables.tf")));
        assert!(!is_terraform_file(Path::new("config.tf.json")));
        assert!(!is_terraform_file(Path::new("terraform.tfvars")));
        assert!(!is_terraform_file(Path::new("README.md")));
        assert!(!is_terraform_file(Path::new("tf")));
    }
}
