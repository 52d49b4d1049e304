pub(crate) mod quizzes;
pub(crate) mod submissions;
pub(crate) mod users;
