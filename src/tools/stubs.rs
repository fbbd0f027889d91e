//! Dangerous tool stubs
//!
//! Browser, filesystem and system tools are declared so the planner and
//! selector know they exist, but every call fails closed. Enabling any of
//! them needs per-action confirmation, sandboxing and an audit trail first.

use async_trait::async_trait;

use super::{Params, Tool, ToolCategory, ToolContext, ToolId, ToolResult, ToolSchema};

/// A permanently inert tool
pub struct StubTool {
    id: ToolId,
    message: &'static str,
}

impl StubTool {
    pub fn browser() -> Self {
        Self {
            id: ToolId::Browser,
            message: "This tool requires additional security measures before activation.",
        }
    }

    pub fn filesystem() -> Self {
        Self {
            id: ToolId::Filesystem,
            message: "This tool requires sandbox environment and user confirmation before activation.",
        }
    }

    pub fn system() -> Self {
        Self {
            id: ToolId::System,
            message: "This tool is extremely dangerous and requires maximum security measures before activation.",
        }
    }

    fn display_name(&self) -> &'static str {
        match self.id {
            ToolId::Browser => "Browser",
            ToolId::Filesystem => "Filesystem",
            _ => "System",
        }
    }
}

#[async_trait]
impl Tool for StubTool {
    fn id(&self) -> ToolId {
        self.id
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Dangerous
    }

    fn is_stub(&self) -> bool {
        true
    }

    fn describe(&self) -> ToolSchema {
        let schema = match self.id {
            ToolId::Browser => ToolSchema::new(
                "browser",
                "[STUB] Browse websites and extract information. NOT YET IMPLEMENTED.",
                ToolCategory::Dangerous,
            )
            .with_string_param("url", "URL to browse", true)
            .with_enum_param("action", "Browser action", &["read", "click", "type"], false),
            ToolId::Filesystem => ToolSchema::new(
                "filesystem",
                "[STUB] Read and write files. NOT YET IMPLEMENTED.",
                ToolCategory::Dangerous,
            )
            .with_string_param("path", "File path", true)
            .with_enum_param("operation", "File operation", &["read", "write", "list", "delete"], true)
            .with_string_param("content", "Content to write (for write operation)", false),
            _ => ToolSchema::new(
                "system",
                "[STUB] Execute system commands. NOT YET IMPLEMENTED.",
                ToolCategory::Dangerous,
            )
            .with_string_param("command", "Command to execute", true)
            .with_string_array_param("args", "Command arguments", false),
        };
        schema.stub()
    }

    async fn execute(&self, _params: &Params, _context: &ToolContext) -> anyhow::Result<ToolResult> {
        Ok(ToolResult::error(format!("{} tool is not implemented yet", self.display_name()))
            .with("isStub", true)
            .with("message", self.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_stubs_always_fail_closed() {
        let params = json!({"command": "rm", "args": ["-rf", "/"]}).as_object().cloned().unwrap();
        let ctx = ToolContext::for_user("u1");

        for stub in [StubTool::browser(), StubTool::filesystem(), StubTool::system()] {
            assert!(stub.is_stub());
            assert_eq!(stub.category(), ToolCategory::Dangerous);

            let result = stub.execute(&params, &ctx).await.unwrap();
            assert!(result.error.as_deref().unwrap().ends_with("tool is not implemented yet"));
            assert_eq!(result.get("isStub"), Some(&json!(true)));
            assert!(result.get("message").is_some());
        }
    }

    #[test]
    fn test_stub_schema_is_flagged() {
        let schema = StubTool::system().describe();
        assert!(schema.is_stub);
        assert_eq!(schema.required(), vec!["command"]);
    }
}
