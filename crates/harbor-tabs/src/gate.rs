//! Navigation gate
//!
//! History queries and back/forward/reload are unsafe on a surface that has
//! not produced first content yet. Until the surface reports `DomReady` such
//! commands are dropped: not queued, not reported as errors.

use crate::surface::Surface;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NavigationGate {
    dom_ready: bool,
}

impl NavigationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&mut self) {
        self.dom_ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.dom_ready
    }

    pub fn can_go_back(&self, surface: &dyn Surface) -> bool {
        self.dom_ready && surface.can_go_back()
    }

    pub fn can_go_forward(&self, surface: &dyn Surface) -> bool {
        self.dom_ready && surface.can_go_forward()
    }

    /// Returns whether the command reached the surface.
    pub fn back(&self, surface: &mut dyn Surface) -> bool {
        if !self.can_go_back(surface) {
            tracing::trace!(ready = self.dom_ready, "Back ignored");
            return false;
        }
        issue("back", surface.go_back())
    }

    pub fn forward(&self, surface: &mut dyn Surface) -> bool {
        if !self.can_go_forward(surface) {
            tracing::trace!(ready = self.dom_ready, "Forward ignored");
            return false;
        }
        issue("forward", surface.go_forward())
    }

    pub fn reload(&self, surface: &mut dyn Surface) -> bool {
        if !self.dom_ready {
            tracing::trace!("Reload ignored before first content");
            return false;
        }
        issue("reload", surface.reload())
    }
}

fn issue(command: &str, result: crate::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(command = %command, error = %e, "Surface command failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;
    use crate::tab::TabId;

    fn surface_with_history() -> HeadlessSurface {
        let mut surface = HeadlessSurface::new(TabId::new(0), "https://a.test", None);
        surface.load_url("https://b.test").unwrap();
        surface
    }

    #[test]
    fn test_commands_dropped_until_ready() {
        let mut surface = surface_with_history();
        let mut gate = NavigationGate::new();

        assert!(!gate.back(&mut surface));
        assert!(!gate.reload(&mut surface));
        assert_eq!(surface.current_url().as_deref(), Some("https://b.test"));

        gate.mark_ready();
        assert!(gate.back(&mut surface));
        assert_eq!(surface.current_url().as_deref(), Some("https://a.test"));
        assert!(gate.forward(&mut surface));
        assert!(gate.reload(&mut surface));
    }

    #[test]
    fn test_nothing_to_go_back_to() {
        let mut surface = HeadlessSurface::new(TabId::new(0), "https://a.test", None);
        let mut gate = NavigationGate::new();
        gate.mark_ready();
        assert!(!gate.can_go_back(&surface));
        assert!(!gate.back(&mut surface));
        assert!(!gate.forward(&mut surface));
    }

    #[test]
    fn test_failed_command_reports_false() {
        let mut surface = surface_with_history();
        let mut gate = NavigationGate::new();
        gate.mark_ready();
        surface.close();
        assert!(!gate.reload(&mut surface));
    }
}
