#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::float_cmp)]

pub mod action;
pub mod engine;
pub mod errors;
pub mod scene;
pub mod scheduler;
pub mod utils;

pub use action::animate::{Animate, Animation};
pub use action::compose::{
    Repeat, RepeatForever, ReverseTime, Sequence, Spawn, Speed, TargetedAction,
};
pub use action::instant::{CallFunc, FlipX, FlipY, Hide, Place, RemoveSelf, Show, ToggleVisibility};
pub use action::interval::DelayTime;
pub use action::manager::ActionManager;
pub use action::tween::{
    ActionFloat, BezierBy, BezierConfig, BezierTo, Blink, FadeIn, FadeOut, FadeTo, JumpBy, JumpTo,
    MoveBy, MoveTo, ResizeBy, ResizeTo, RotateBy, RotateTo, ScaleBy, ScaleTo, SkewBy, SkewTo,
    TintBy, TintTo,
};
pub use action::{Action, ActionCtx, ActionOps, INVALID_TAG};
pub use engine::Engine;
pub use errors::KinemaError;
pub use scene::{Color, Node, NodeHandle, Scene, SpriteState};
pub use scheduler::{
    JOB_ID_ANY, MainThreadQueue, Scheduler, SchedulerCtx, TimedJob, UpdateJob,
};
