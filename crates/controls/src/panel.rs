use crate::handle::ParameterHandle;
use crate::params::{
    Parameters, COLOR_RANGE, FBM_LOOP_RANGE, TESSELLATION_RANGE, UP_BIAS_RANGE,
};

/// Every tunable widget on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    Tessellation,
    BottomR,
    BottomG,
    BottomB,
    TopR,
    TopG,
    TopB,
    FbmLoop,
    UpBias,
}

impl Widget {
    pub const ALL: [Widget; 9] = [
        Widget::Tessellation,
        Widget::BottomR,
        Widget::BottomG,
        Widget::BottomB,
        Widget::TopR,
        Widget::TopG,
        Widget::TopB,
        Widget::FbmLoop,
        Widget::UpBias,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Layout and range of the slider backing this widget.
    pub fn spec(self) -> WidgetSpec {
        let color = |label| WidgetSpec {
            label,
            folder: None,
            min: *COLOR_RANGE.start(),
            max: *COLOR_RANGE.end(),
            step: 1.0,
        };
        match self {
            Widget::Tessellation => WidgetSpec {
                label: "tesselations",
                folder: None,
                min: *TESSELLATION_RANGE.start() as f32,
                max: *TESSELLATION_RANGE.end() as f32,
                step: 1.0,
            },
            Widget::BottomR => color("r").in_folder("BottomColor"),
            Widget::BottomG => color("g").in_folder("BottomColor"),
            Widget::BottomB => color("b").in_folder("BottomColor"),
            Widget::TopR => color("r").in_folder("TopColor"),
            Widget::TopG => color("g").in_folder("TopColor"),
            Widget::TopB => color("b").in_folder("TopColor"),
            Widget::FbmLoop => WidgetSpec {
                label: "fbmLoop",
                folder: Some("NoiseController"),
                min: *FBM_LOOP_RANGE.start(),
                max: *FBM_LOOP_RANGE.end(),
                step: 1.0,
            },
            Widget::UpBias => WidgetSpec {
                label: "upBias",
                folder: Some("NoiseController"),
                min: *UP_BIAS_RANGE.start(),
                max: *UP_BIAS_RANGE.end(),
                step: 1.0,
            },
        }
    }

    fn read(self, params: &Parameters) -> f32 {
        match self {
            Widget::Tessellation => params.tessellation as f32,
            Widget::BottomR => params.bottom_color.r,
            Widget::BottomG => params.bottom_color.g,
            Widget::BottomB => params.bottom_color.b,
            Widget::TopR => params.top_color.r,
            Widget::TopG => params.top_color.g,
            Widget::TopB => params.top_color.b,
            Widget::FbmLoop => params.noise.fbm_loop,
            Widget::UpBias => params.noise.up_bias,
        }
    }

    fn write(self, params: &mut Parameters, value: f32) {
        match self {
            Widget::Tessellation => params.tessellation = value as u32,
            Widget::BottomR => params.bottom_color.r = value,
            Widget::BottomG => params.bottom_color.g = value,
            Widget::BottomB => params.bottom_color.b = value,
            Widget::TopR => params.top_color.r = value,
            Widget::TopG => params.top_color.g = value,
            Widget::TopB => params.top_color.b = value,
            Widget::FbmLoop => params.noise.fbm_loop = value,
            Widget::UpBias => params.noise.up_bias = value,
        }
    }
}

/// Static description of a slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetSpec {
    pub label: &'static str,
    pub folder: Option<&'static str>,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl WidgetSpec {
    fn in_folder(mut self, folder: &'static str) -> Self {
        self.folder = Some(folder);
        self
    }

    /// Clamps into range and snaps to the nearest step.
    pub fn snap(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).min(self.max)
    }
}

/// Folder names in display order.
pub const FOLDERS: [&str; 3] = ["BottomColor", "TopColor", "NoiseController"];

/// Buttons exposed next to the sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// Rebuild the scene geometry with the current parameters.
    LoadScene,
    /// Restore every parameter to its initial value.
    RestoreDefaults,
}

/// Widget model for the control surface.
///
/// Displayed values are cached per widget and only refresh when the panel
/// itself writes a value or [`ControlPanel::update_display`] runs, so changes
/// made through another [`ParameterHandle`] clone stay invisible until then.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    handle: ParameterHandle,
    displayed: [f32; Widget::ALL.len()],
}

impl ControlPanel {
    pub fn new(handle: ParameterHandle) -> Self {
        let mut panel = Self {
            handle,
            displayed: [0.0; Widget::ALL.len()],
        };
        panel.update_display();
        panel
    }

    pub fn handle(&self) -> &ParameterHandle {
        &self.handle
    }

    /// Value currently shown by `widget`.
    pub fn displayed(&self, widget: Widget) -> f32 {
        self.displayed[widget.index()]
    }

    /// Writes `value` through the slider semantics and returns what was stored.
    pub fn set(&mut self, widget: Widget, value: f32) -> f32 {
        let snapped = widget.spec().snap(value);
        self.handle.update(|params| widget.write(params, snapped));
        self.displayed[widget.index()] = snapped;
        tracing::debug!(?widget, value = snapped, "control panel updated");
        snapped
    }

    /// Moves `widget` by `steps` slider increments.
    pub fn nudge(&mut self, widget: Widget, steps: i32) -> f32 {
        let current = widget.read(&self.handle.snapshot());
        self.set(widget, current + steps as f32 * widget.spec().step)
    }

    /// Handles a button press. Returns the action so the host can react to it.
    pub fn trigger(&mut self, action: PanelAction) -> PanelAction {
        if action == PanelAction::RestoreDefaults {
            self.reset();
        }
        action
    }

    /// Restores defaults and refreshes every widget.
    pub fn reset(&mut self) {
        self.handle.reset();
        self.update_display();
        tracing::info!("control panel restored to initial values");
    }

    /// Re-reads every widget value from the shared parameters.
    pub fn update_display(&mut self) {
        let params = self.handle.snapshot();
        for widget in Widget::ALL {
            self.displayed[widget.index()] = widget.read(&params);
        }
    }
}
