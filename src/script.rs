// Copyright (c) 2026 rezky_nightky

use std::path::Path;

use mlua::{Function, Lua, MultiValue, Value};

use crate::error::{OffsetError, ScriptError};
use crate::offset::{OffsetFunction, OffsetPair};

pub const ENTRY_POINT: &str = "compute_offsets";

pub struct LuaOffsetFunction {
    name: String,
    function: Function,
    // Keeps the interpreter state that `function` refers to alive.
    _lua: Lua,
}

impl LuaOffsetFunction {
    pub fn from_source(name: &str, source: &str) -> Result<Self, ScriptError> {
        let lua = Lua::new();
        lua.load(source).set_name(name).exec()?;
        let value: Value = lua.globals().get(ENTRY_POINT)?;
        let function = match value {
            Value::Function(f) => f,
            Value::Nil => return Err(ScriptError::MissingFunction(ENTRY_POINT)),
            _ => return Err(ScriptError::NotAFunction(ENTRY_POINT)),
        };
        Ok(Self {
            name: name.to_string(),
            function,
            _lua: lua,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "offset script".to_string());
        Self::from_source(&name, &source)
    }
}

fn as_offset(value: Option<Value>, position: usize, axis: &'static str) -> Result<i32, OffsetError> {
    let out_of_range = |value: String| OffsetError::OutOfRange {
        position,
        axis,
        value,
    };
    match value {
        Some(Value::Integer(i)) => i32::try_from(i).map_err(|_| out_of_range(i.to_string())),
        Some(Value::Number(n)) => {
            let t = n.trunc();
            if t >= i32::MIN as f64 && t <= i32::MAX as f64 {
                Ok(t as i32)
            } else {
                Err(out_of_range(n.to_string()))
            }
        }
        _ => Err(OffsetError::NotANumber { position, axis }),
    }
}

impl OffsetFunction for LuaOffsetFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, y: i32) -> Result<OffsetPair, OffsetError> {
        let values: MultiValue = self.function.call(y)?;
        if values.len() != 2 {
            return Err(OffsetError::WrongArity(values.len()));
        }
        let mut it = values.into_iter();
        let x = as_offset(it.next(), 1, "x")?;
        let y = as_offset(it.next(), 2, "y")?;
        Ok((x, y))
    }
}
