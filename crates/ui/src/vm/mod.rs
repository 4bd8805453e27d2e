mod admin_vm;
mod quiz_vm;
mod time_fmt;

pub use admin_vm::{
    QuestionForm, QuestionRowVm, ScoreRowVm, account_error_message, delete_message,
    map_question_rows, map_score_rows, password_message, question_error_message,
};
pub use quiz_vm::{
    OptionVm, QuizVm, ResponseRowVm, ResultVm, StatusCellVm, map_quiz_snapshot,
};
pub use time_fmt::{format_countdown, format_datetime};
