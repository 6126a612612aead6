//! Prompt templates for extraction, query translation, and answer synthesis

/// System instruction for the extraction model.
pub const EXTRACTION_SYSTEM_INSTRUCTION: &str =
    "You are a helpful IT-project and account management expert who extracts information from documents.";

const TEXT_MARKER: &str = "{ctext}";
const QUESTION_MARKER: &str = "{question}";
const CONTEXT_MARKER: &str = "{context}";

/// The fixed answer used whenever the graph holds nothing relevant.
pub const NO_INFORMATION_ANSWER: &str =
    "I don't know the answer. The knowledge graph has no information about that yet.";

/// Instruction template for entity/relationship extraction. The entity and
/// relationship vocabulary here is the closed set the compiler accepts.
const EXTRACTION_TEMPLATE: &str = r#"
From the text below, extract entities and relationships in the format described here.
0. ALWAYS FINISH THE OUTPUT. Never send partial responses.
1. First look for these entity types in the text. The `id` property of each entity must be alphanumeric, lower-case, and unique among the entities; relationships refer to entities by this property. Do not invent entity types that are not listed below. Generate as many entities as the text supports:
    Entity types:
    label:'Person',id:string,name:string,dob:string //`id` is the person's name in lower-case; `name` is the name as spelled in the text; `dob` is the date of birth
    label:'Technology',id:string,name:string,releaseTime:string //`id` is the technology name in lower-case; `releaseTime` is the date or year it was released
    label:'Organization',id:string,name:string,description:string //`id` is the organization name in lower-case; `description` is a brief description of what it does
    label:'University',id:string,name:string //`id` is the university name in lower-case
    label:'Concept',id:string,name:string,description:string //`id` is the concept name in lower-case; `description` is a brief description of the concept
2. Next generate each relationship as a triple of head entity id, relationship type, and tail entity id, separated by '|'. Only use the relationship types listed below, with the listed head and tail entity types. Generate as many relationships as the text supports:
    Relationship types:
    person|WORK_AT|organization
    person|DEVELOPE|technology
    person|STUDY_AT|university
    person|PROPOSE|concept
    organization|RELEASE|technology
    concept|IS_RELATED_TO|concept
3. The output must be a single JSON object shaped like:
{
    "entities": [{"label":"Person","id":string,"name":string,"dob":string}],
    "relationships": ["personid|WORK_AT|organizationid"]
}

Case Sheet:
{ctext}
"#;

/// The graph schema, as the query-translation model sees it.
const SCHEMA_DESCRIPTION: &str = r#"Entity tables (record id is the entity's lower-case id):
    person(id, name, dob)
    technology(id, name, releaseTime)
    organization(id, name, description)
    university(id, name)
    concept(id, name, description)
Relation tables (directed edges, traversed with arrow syntax):
    work_at: person -> organization
    develope: person -> technology
    study_at: person -> university
    propose: person -> concept
    release: organization -> technology
    is_related_to: concept -> concept"#;

/// Instruction template turning a question into one read-only SurrealQL
/// SELECT statement.
const QUERY_TEMPLATE: &str = r#"
You are an expert SurrealQL translator who converts English questions to SurrealQL based on the schema provided, following the instructions below:
1. Generate exactly one SELECT statement and nothing else. No explanations, no markdown.
2. Never use CREATE, INSERT, UPDATE, UPSERT, DELETE, RELATE, DEFINE, or REMOVE.
3. Use only the tables and relations mentioned in the schema.
4. Always match properties case-insensitively and fuzzily. For example, to find a person called Alice use `string::lowercase(name) CONTAINS 'alice'`; to find a logistics concept use `string::lowercase(name) CONTAINS 'logistics' OR string::lowercase(description) CONTAINS 'logistics'`.
5. Traverse relations with arrow syntax: `->work_at->organization` follows an edge forwards, `<-work_at<-person` follows it backwards.

schema:
{context}

Examples:
Question: Which organizations does Alice work at?
Answer: SELECT name, ->work_at->organization.name AS organizations FROM person WHERE string::lowercase(name) CONTAINS 'alice'
Question: Who studied at MIT?
Answer: SELECT name FROM person WHERE ->study_at->(university WHERE string::lowercase(name) CONTAINS 'mit')
Question: Which technologies did Acme release?
Answer: SELECT name, ->release->technology.name AS technologies FROM organization WHERE string::lowercase(name) CONTAINS 'acme'

Question: {question}
"#;

/// Instruction template turning raw result rows back into prose.
const ANSWER_TEMPLATE: &str = r#"
You are an assistant that forms clear, human-readable answers.
The information section contains the facts you must base the answer on.
The provided information is authoritative: never doubt it and never amend it with your own knowledge.
Make the answer sound like a direct response to the question and do not mention the information section.
If the provided information is empty, say that you don't know the answer.
Information:
{context}

Question: {question}
Helpful Answer:"#;

pub fn extraction_prompt(text: &str) -> String {
    EXTRACTION_TEMPLATE.replace(TEXT_MARKER, text)
}

pub fn query_prompt(question: &str) -> String {
    QUERY_TEMPLATE
        .replace(CONTEXT_MARKER, SCHEMA_DESCRIPTION)
        .replace(QUESTION_MARKER, question)
}

pub fn answer_prompt(question: &str, context: &str) -> String {
    ANSWER_TEMPLATE
        .replace(CONTEXT_MARKER, context)
        .replace(QUESTION_MARKER, question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgchat_core::RelationType;

    #[test]
    fn extraction_prompt_embeds_the_text() {
        let prompt = extraction_prompt("Alice works at Acme.");
        assert!(prompt.contains("Alice works at Acme."));
        assert!(!prompt.contains(TEXT_MARKER));
    }

    #[test]
    fn extraction_prompt_lists_every_relation_type() {
        let prompt = extraction_prompt("");
        for relation in RelationType::ALL {
            assert!(prompt.contains(relation.wire_name()), "missing {:?}", relation);
        }
    }

    #[test]
    fn query_prompt_embeds_schema_and_question() {
        let prompt = query_prompt("Who works at Acme?");
        assert!(prompt.contains("Who works at Acme?"));
        assert!(prompt.contains("work_at: person -> organization"));
        assert!(!prompt.contains(QUESTION_MARKER));
    }

    #[test]
    fn answer_prompt_fills_both_markers() {
        let prompt = answer_prompt("Who is Alice?", "[{ name: 'Alice' }]");
        assert!(prompt.contains("Who is Alice?"));
        assert!(prompt.contains("[{ name: 'Alice' }]"));
        assert!(!prompt.contains(CONTEXT_MARKER));
    }
}
