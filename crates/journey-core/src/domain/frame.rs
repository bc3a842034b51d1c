//! Description of the embedded journey frame.
//!
//! [`FrameSpec`] is everything an overlay implementation needs to build the
//! `<iframe>` element.  It is computed once from a validated connection and
//! the settings, then handed to `Overlay::create`.

use std::fmt;

use crate::domain::connection::ValidatedConnection;
use crate::domain::origins::TrustedOrigins;

/// Default `title` attribute of the frame.
pub const DEFAULT_FRAME_TITLE: &str = "D·One Connection Journey";

/// Prefix of the frame's `id` attribute; the session id is appended.
pub const FRAME_ID_PREFIX: &str = "dataone-iframe-";

/// Tokens accepted by the iframe `sandbox` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxPermission {
    AllowSameOrigin,
    AllowScripts,
    AllowForms,
    AllowPopups,
    AllowPopupsToEscapeSandbox,
    AllowTopNavigation,
    AllowTopNavigationByUserActivation,
    AllowModals,
    AllowPointerLock,
    AllowPresentation,
    AllowStorageAccessByUserActivation,
}

impl SandboxPermission {
    /// The permission set the journey frame is created with.
    ///
    /// Excludes unrestricted top navigation, pointer lock and presentation.
    pub const JOURNEY: &'static [SandboxPermission] = &[
        SandboxPermission::AllowSameOrigin,
        SandboxPermission::AllowScripts,
        SandboxPermission::AllowForms,
        SandboxPermission::AllowPopups,
        SandboxPermission::AllowPopupsToEscapeSandbox,
        SandboxPermission::AllowTopNavigationByUserActivation,
        SandboxPermission::AllowModals,
        SandboxPermission::AllowStorageAccessByUserActivation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SandboxPermission::AllowSameOrigin => "allow-same-origin",
            SandboxPermission::AllowScripts => "allow-scripts",
            SandboxPermission::AllowForms => "allow-forms",
            SandboxPermission::AllowPopups => "allow-popups",
            SandboxPermission::AllowPopupsToEscapeSandbox => "allow-popups-to-escape-sandbox",
            SandboxPermission::AllowTopNavigation => "allow-top-navigation",
            SandboxPermission::AllowTopNavigationByUserActivation => {
                "allow-top-navigation-by-user-activation"
            }
            SandboxPermission::AllowModals => "allow-modals",
            SandboxPermission::AllowPointerLock => "allow-pointer-lock",
            SandboxPermission::AllowPresentation => "allow-presentation",
            SandboxPermission::AllowStorageAccessByUserActivation => {
                "allow-storage-access-by-user-activation"
            }
        }
    }
}

impl fmt::Display for SandboxPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the iframe `loading` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLoading {
    Eager,
    Lazy,
}

impl FrameLoading {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameLoading::Eager => "eager",
            FrameLoading::Lazy => "lazy",
        }
    }
}

/// Attributes of the embedded journey frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    /// Connection URL with `sessionId` appended.
    pub src: String,
    /// Element id, `dataone-iframe-<session id>`.
    pub id: String,
    pub title: String,
    /// Value of the `data-session-id` attribute.
    pub session_id: String,
    pub sandbox: Vec<SandboxPermission>,
    /// Value of the `allow` attribute.
    pub allow: String,
    pub loading: FrameLoading,
}

impl FrameSpec {
    /// Builds the frame description for a validated connection.
    pub fn for_connection(
        connection: &ValidatedConnection,
        origins: &TrustedOrigins,
        title: &str,
    ) -> Self {
        Self {
            src: connection.frame_src(),
            id: format!("{FRAME_ID_PREFIX}{}", connection.session_id()),
            title: title.to_string(),
            session_id: connection.session_id().to_string(),
            sandbox: SandboxPermission::JOURNEY.to_vec(),
            allow: origins.permissions_policy(),
            loading: FrameLoading::Lazy,
        }
    }

    /// Space-separated `sandbox` attribute value.
    pub fn sandbox_attribute(&self) -> String {
        self.sandbox
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
