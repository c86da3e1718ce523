// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::types::TypeDesc;
use std::fmt;

/// A best-effort fallback taken during compilation. Each one is also
/// logged at `warn` level when raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// `Final` without a type argument; the type was taken from the default.
    FinalInferredFromDefault { inferred: TypeDesc },
    /// `Final` without a type argument and a factory default; compiled as `Any`.
    FinalFromFactory,
    /// `Final` without a type argument or default; compiled as `Any`.
    FinalWithoutType,
    /// A plain annotated class was treated as a dataclass.
    CoercedAnnotatedClass { record: String },
}

impl CompileWarning {
    pub(crate) fn emit(self, sink: &mut Vec<CompileWarning>) {
        log::warn!("[compiler] {self}");
        sink.push(self);
    }
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FinalInferredFromDefault { inferred } => write!(
                f,
                "Final field without a type argument; inferred {inferred} from its default"
            ),
            Self::FinalFromFactory => f.write_str(
                "Final field without a type argument has a default factory; \
                 the type cannot be inferred and Any is used",
            ),
            Self::FinalWithoutType => f.write_str(
                "Final field without a type argument or default; Any is used",
            ),
            Self::CoercedAnnotatedClass { record } => {
                write!(f, "{record} is not a dataclass; coerced from its annotations")
            }
        }
    }
}
