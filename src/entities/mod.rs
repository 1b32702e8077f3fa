pub mod party;
pub mod quotation_form;
pub mod quotation_sequence;
pub mod salesman;
