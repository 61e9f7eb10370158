/// Command-line options for the terminal viewer
use orbview_core::{
    CameraDrive, CameraLimits, ConfigError, FillStyle, ProjectionMode, SceneConfig, Shape,
};

pub const USAGE: &str = "\
Usage: orbview-terminal [OPTIONS]

Options:
  --projection <perspective|ortho|frustum>   projection mode (default: perspective)
  --fill-style <fill|wireframe|fillwireframe> fill style for every model
  --shape <cube|sphere|cone>                 mesh for every model (default: cube)
  --free-camera                              let A/D move the eye off the orbit
  --clamp                                    keep zoom and field of view in range
  -h, --help                                 print this help";

/// Parsed command line. Unset options keep the default scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub projection: Option<ProjectionMode>,
    pub fill_style: Option<FillStyle>,
    pub shape: Option<Shape>,
    pub free_camera: bool,
    pub clamp: bool,
    pub help: bool,
}

impl CliOptions {
    /// Parse arguments, excluding the program name
    pub fn parse<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            let mut value = || {
                args.next()
                    .map(|v| v.as_ref().to_string())
                    .ok_or_else(|| ConfigError::MissingValue(arg.to_string()))
            };

            match arg {
                "--projection" => options.projection = Some(value()?.parse()?),
                "--fill-style" => options.fill_style = Some(value()?.parse()?),
                "--shape" => options.shape = Some(value()?.parse()?),
                "--free-camera" => options.free_camera = true,
                "--clamp" => options.clamp = true,
                "-h" | "--help" => options.help = true,
                other => return Err(ConfigError::UnknownArgument(other.to_string())),
            }
        }

        Ok(options)
    }

    /// Apply the options on top of the default scene
    pub fn scene_config(&self) -> SceneConfig {
        let mut config = SceneConfig::default();
        if let Some(projection) = self.projection {
            config = config.with_projection(projection);
        }
        if let Some(fill_style) = self.fill_style {
            config = config.with_fill_style(fill_style);
        }
        if let Some(shape) = self.shape {
            config = config.with_shape(shape);
        }
        if self.free_camera {
            config.camera.drive = CameraDrive::Free;
        }
        if self.clamp {
            config.camera.limits = Some(CameraLimits::default());
        }
        config
    }
}
