//! Signal declarations and the dump header they live in.

use std::collections::HashMap;

use serde::Serialize;

use crate::time::Timescale;

/// Dense index of a declared signal, assigned in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SignalId(u32);

impl SignalId {
    /// Creates a signal ID from a raw index.
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense index of a distinct identifier code, assigned in first-use order.
///
/// Several signals may share one code when the dump aliases them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdCode(u32);

impl IdCode {
    /// Creates a code index from a raw value.
    pub const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// One `$var` declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Signal {
    /// Declaration-order index.
    pub id: SignalId,
    /// The identifier code as written in the dump, e.g. `!` or `"#`.
    pub code: String,
    /// The variable's local name.
    pub name: String,
    /// Enclosing scope names, outermost first.
    pub scope: Vec<String>,
    /// Bit width, always at least 1.
    pub width: u32,
    /// Declared variable type (`wire`, `reg`, `integer`, ...).
    pub var_type: String,
    /// Optional bit-range suffix such as `[3:0]`.
    pub range: Option<String>,
}

impl Signal {
    /// Returns the scope path and name joined with `.`.
    pub fn full_name(&self) -> String {
        if self.scope.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.scope.join("."), self.name)
        }
    }
}

/// A `$scope` declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScopeDecl {
    /// Scope kind (`module`, `begin`, `task`, ...).
    pub kind: String,
    /// Full path of the scope, outermost first, ending in its own name.
    pub path: Vec<String>,
}

/// Everything declared before `$enddefinitions`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceHeader {
    /// Duration of one tick.
    pub timescale: Timescale,
    /// Declared signals in declaration order, indexed by [`SignalId`].
    pub signals: Vec<Signal>,
    /// Declared scopes in declaration order.
    pub scopes: Vec<ScopeDecl>,
    /// Text of `$date`, if present.
    pub date: Option<String>,
    /// Text of `$version`, if present.
    pub version: Option<String>,
    codes: HashMap<String, IdCode>,
    aliases: Vec<Vec<SignalId>>,
}

impl TraceHeader {
    /// Returns the signal with the given ID.
    pub fn signal(&self, id: SignalId) -> Option<&Signal> {
        self.signals.get(id.index())
    }

    /// Resolves a textual identifier code.
    pub fn code(&self, text: &str) -> Option<IdCode> {
        self.codes.get(text).copied()
    }

    /// Returns every signal bound to `code`.
    pub fn signals_with_code(&self, code: IdCode) -> &[SignalId] {
        self.aliases
            .get(code.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the number of distinct identifier codes.
    pub fn code_count(&self) -> usize {
        self.aliases.len()
    }

    /// Returns the width shared by all signals bound to `code`.
    pub fn code_width(&self, code: IdCode) -> Option<u32> {
        let first = *self.signals_with_code(code).first()?;
        self.signal(first).map(|s| s.width)
    }

    /// Registers a declaration and returns its ID.
    ///
    /// Returns `Err` with the width of the existing binding when `code`
    /// is already bound to signals of a different width.
    pub(crate) fn declare(
        &mut self,
        code: &str,
        name: String,
        scope: Vec<String>,
        width: u32,
        var_type: String,
        range: Option<String>,
    ) -> Result<SignalId, u32> {
        let existing = self.code(code);
        if let Some(existing) = existing {
            if let Some(w) = self.code_width(existing) {
                if w != width {
                    return Err(w);
                }
            }
        }
        let id = SignalId(self.signals.len() as u32);
        self.signals.push(Signal {
            id,
            code: code.to_string(),
            name,
            scope,
            width,
            var_type,
            range,
        });
        let code_id = match existing {
            Some(c) => c,
            None => {
                let c = IdCode(self.aliases.len() as u32);
                self.codes.insert(code.to_string(), c);
                self.aliases.push(Vec::new());
                c
            }
        };
        self.aliases[code_id.0 as usize].push(id);
        Ok(id)
    }
}
