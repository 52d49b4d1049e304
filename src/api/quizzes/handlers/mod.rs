mod create;
mod list;
mod manage;
mod results;

pub(super) use create::{create_quiz, generate_quiz};
pub(super) use list::list_my_quizzes;
pub(super) use manage::{delete_quiz, get_quiz, toggle_quiz, update_quiz};
pub(super) use results::{get_answer_detail, list_participants, submit_quiz};
