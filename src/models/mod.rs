/// Data models module
///
/// This module defines the rows stored for the question feature and the small
/// enums that give typed meaning to their text columns.

mod question;
pub use question::{NewQuestion, Question};

mod answer;
pub use answer::NewAnswer;

mod tag;
pub use tag::{NewTag, Tag};

mod question_tag;
pub use question_tag::QuestionTag;

mod rank;
pub use rank::{MetricPeriod, PeriodCounts, QuestionRank};

mod reaction;
pub use reaction::{NewQuestionReaction, QuestionReaction, ReactionKind};

mod comment;
pub use comment::{Comment, NewComment, QuestionComment};

mod user;
pub use user::{Cosmetic, NewUser, User, UserCosmetic};
