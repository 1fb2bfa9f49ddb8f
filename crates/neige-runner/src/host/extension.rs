//! Script templates addressed to the host extension module.

use neige_rpc::Value;

/// Host API method that runs a Lua chunk with positional arguments.
pub const EXEC_LUA_METHOD: &str = "nvim_exec_lua";

/// The host-side Lua module that owns the runner's channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostExtension {
    name: String,
}

impl HostExtension {
    /// Targets the extension module loaded as `require(name)`.
    ///
    /// The name is embedded verbatim in generated scripts; callers validate
    /// it first (see [`RunnerConfig::validate`](crate::RunnerConfig::validate)).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Module name passed to `require`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Script announcing this connection's channel id.
    ///
    /// Expects `[channel_id]` as its arguments.
    #[must_use]
    pub fn registration_script(&self) -> String {
        format!(
            "local args = ...\n\
             local chan_id = args[1]\n\
             require(\"{name}\"):_set_chan_id(chan_id)\n",
            name = self.name
        )
    }

    /// Script delivering one evaluation outcome.
    ///
    /// Expects `[serial, [success, text]]` as its arguments.
    #[must_use]
    pub fn response_script(&self) -> String {
        format!(
            "local args = ...\n\
             local run_id = args[1]\n\
             local res = args[2]\n\
             require(\"{name}\").on_response(run_id, res)\n",
            name = self.name
        )
    }

    /// Builds `nvim_exec_lua` parameters for `script` with positional `args`.
    pub(crate) fn exec_params(script: String, args: Vec<Value>) -> Vec<Value> {
        vec![Value::from(script), Value::Array(args)]
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn registration_script_sets_channel_on_named_module() {
        let script = HostExtension::new("neige").registration_script();
        assert_eq!(
            script,
            "local args = ...\nlocal chan_id = args[1]\nrequire(\"neige\"):_set_chan_id(chan_id)\n"
        );
    }

    #[rstest]
    fn response_script_calls_on_response() {
        let script = HostExtension::new("my.ext").response_script();
        assert_eq!(
            script,
            "local args = ...\nlocal run_id = args[1]\nlocal res = args[2]\n\
             require(\"my.ext\").on_response(run_id, res)\n"
        );
    }

    #[rstest]
    fn exec_params_pair_script_with_argument_array() {
        let params = HostExtension::exec_params("return 1".to_owned(), vec![Value::from(3)]);
        assert_eq!(
            params,
            vec![Value::from("return 1"), Value::Array(vec![Value::from(3)])]
        );
    }
}
