pub mod comment_input;
pub mod mention_picker;

pub use comment_input::{
    CommentInput, CommentInputProps, CommentInputState, DeviceClass, TOUCH_BREAKPOINT_PX,
};
pub use mention_picker::MentionPicker;
