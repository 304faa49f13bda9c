//! Host shell entry points: camera permission gate and scanner launch.

use crate::error::ScanFault;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl From<bool> for PermissionStatus {
    fn from(granted: bool) -> Self {
        if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }
}

/// What the gate asked the host to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Launched,
    RequestedPermission,
    OpenedSettings,
}

/// Operations provided by the host UI shell.
pub trait HostShell {
    /// Opens the scanning surface.
    fn launch_scanner(&mut self);

    /// Starts the host's standard camera permission flow.
    fn request_camera_permission(&mut self);

    /// The host wants to explain why the camera is needed before asking again.
    fn should_show_rationale(&self) -> bool;

    /// Routes the user to the system permission settings.
    fn open_permission_settings(&mut self);
}

/// Launches the scanner if the camera is available, otherwise asks for it.
pub fn request_camera_and_start(shell: &mut dyn HostShell, status: PermissionStatus) -> GateDecision {
    match status {
        PermissionStatus::Granted => {
            shell.launch_scanner();
            GateDecision::Launched
        }
        PermissionStatus::Denied if shell.should_show_rationale() => {
            log::info!("camera permission previously denied, routing to settings");
            shell.open_permission_settings();
            GateDecision::OpenedSettings
        }
        PermissionStatus::Denied => {
            log::info!("requesting camera permission");
            shell.request_camera_permission();
            GateDecision::RequestedPermission
        }
    }
}

/// Handles the answer of the permission flow.
pub fn on_permission_result(shell: &mut dyn HostShell, granted: bool) -> Result<(), ScanFault> {
    match PermissionStatus::from(granted) {
        PermissionStatus::Granted => {
            shell.launch_scanner();
            Ok(())
        }
        PermissionStatus::Denied => {
            log::info!("camera permission denied, staying on current screen");
            Err(ScanFault::PermissionDenied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingShell {
        rationale: bool,
        calls: Vec<&'static str>,
    }

    impl HostShell for RecordingShell {
        fn launch_scanner(&mut self) {
            self.calls.push("launch");
        }

        fn request_camera_permission(&mut self) {
            self.calls.push("request");
        }

        fn should_show_rationale(&self) -> bool {
            self.rationale
        }

        fn open_permission_settings(&mut self) {
            self.calls.push("settings");
        }
    }

    #[test]
    fn granted_launches_directly() {
        let mut shell = RecordingShell::default();
        let decision = request_camera_and_start(&mut shell, PermissionStatus::Granted);
        assert_eq!(decision, GateDecision::Launched);
        assert_eq!(shell.calls, vec!["launch"]);
    }

    #[test]
    fn denied_requests_permission() {
        let mut shell = RecordingShell::default();
        let decision = request_camera_and_start(&mut shell, PermissionStatus::Denied);
        assert_eq!(decision, GateDecision::RequestedPermission);
        assert_eq!(shell.calls, vec!["request"]);
    }

    #[test]
    fn denied_with_rationale_opens_settings() {
        let mut shell = RecordingShell {
            rationale: true,
            ..RecordingShell::default()
        };
        let decision = request_camera_and_start(&mut shell, PermissionStatus::Denied);
        assert_eq!(decision, GateDecision::OpenedSettings);
        assert_eq!(shell.calls, vec!["settings"]);
    }

    #[test]
    fn permission_result_launches_or_reports_denial() {
        let mut shell = RecordingShell::default();
        assert_eq!(on_permission_result(&mut shell, true), Ok(()));
        assert_eq!(
            on_permission_result(&mut shell, false),
            Err(ScanFault::PermissionDenied)
        );
        assert_eq!(shell.calls, vec!["launch"]);
    }
}
