mod detail;
mod index;
mod results;

pub use detail::{question_detail, DetailData, DetailPage, QuestionDetailFn};
pub use index::{index_data, IndexData, IndexDataFn, IndexPage};
pub use results::{question_results, QuestionResultsFn, ResultsPage};
