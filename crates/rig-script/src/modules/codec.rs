//! Structured-data codec exposed to drivers as the `json` table.

use mlua::{Lua, LuaSerdeExt, Table, Value};

use crate::capability::CapabilityModule;

/// JSON codec for driver scripts.
///
/// Installed as the global `json` table with `json.encode(value)` and
/// `json.decode(text)`. Values bridge through `serde_json`, so anything
/// a driver can express as plain tables, strings, numbers, and booleans
/// round-trips; functions and userdata raise a Lua error the driver may
/// trap with `pcall`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecModule;

impl CodecModule {
    /// Creates the codec module.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CapabilityModule for CodecModule {
    fn name(&self) -> &str {
        "json"
    }

    fn install(&self, lua: &Lua, table: &Table) -> Result<(), mlua::Error> {
        table.set(
            "encode",
            lua.create_function(|lua, value: Value| {
                let json: serde_json::Value = lua.from_value(value)?;
                serde_json::to_string(&json).map_err(mlua::Error::external)
            })?,
        )?;

        table.set(
            "decode",
            lua.create_function(|lua, text: String| {
                let json: serde_json::Value =
                    serde_json::from_str(&text).map_err(mlua::Error::external)?;
                lua.to_value(&json)
            })?,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptEngine;

    #[test]
    fn decode_rejects_malformed_text() {
        let mut engine = ScriptEngine::new(
            "trx0",
            "codec-test",
            r#"
            function try_decode(data)
                local ok, result = pcall(json.decode, data)
                if ok then
                    return "decoded"
                end
                return "rejected"
            end
            "#,
            &crate::standard_modules("trx0"),
        )
        .expect("construct engine");

        let reply = engine.invoke("try_decode", "{not json").expect("invoke");
        assert_eq!(reply.as_deref(), Some("rejected"));

        let reply = engine.invoke("try_decode", "{\"a\":1}").expect("invoke");
        assert_eq!(reply.as_deref(), Some("decoded"));
    }
}
