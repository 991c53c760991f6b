//! The UK-SPEC reference catalog: five areas and their sub-competencies.
//!
//! Fixture data. Keyword hints are stored comma-separated and split on load.

use crate::catalog::CompetencyCatalog;
use crate::types::{CompetencyArea, CompetencyAreaCode, SubCompetency};

struct ReferenceEntry {
    area: CompetencyAreaCode,
    code: &'static str,
    title: &'static str,
    description: &'static str,
    keywords: &'static str,
}

const AREA_TITLES: [(CompetencyAreaCode, &str); 5] = [
    (CompetencyAreaCode::A, "Knowledge and understanding"),
    (
        CompetencyAreaCode::B,
        "Design and development of processes, systems, services and products",
    ),
    (CompetencyAreaCode::C, "Responsibility, management or leadership"),
    (CompetencyAreaCode::D, "Communication and inter-personal skills"),
    (CompetencyAreaCode::E, "Professional Commitment"),
];

const ENTRIES: &[ReferenceEntry] = &[
    ReferenceEntry {
        area: CompetencyAreaCode::A,
        code: "A1",
        title: "Maintain and extend a sound theoretical approach in enabling the introduction and exploitation of new and advancing technology and other relevant developments.",
        description: "Chartered Engineers must be competent throughout their working life, by virtue of their education, training and experience to: Use a combination of general and specialist engineering knowledge and understanding to optimise the application of existing and emerging technology. A1 Maintain and extend a sound theoretical approach in enabling the introduction and exploitation of new and advancing technology and other relevant developments. This could include an ability to: Identify the limits of own personal knowledge and skills. Strive to extend own technological capability. Broaden and deepen own knowledge base through research and experimentation. Engage in formal post-graduate academic study. Learn and develop new engineering theories and techniques in the workplace. Broaden your knowledge of engineering codes, standards and specifications.",
        keywords: "research, experimentation, new technology, advancing technology, post-graduate study, extend knowledge base, learn new theories, engineering codes, standards, specifications, identify limits of knowledge, extend capability",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::A,
        code: "A2",
        title: "Engage in the creative and innovative development of engineering technology and continuous improvement systems.",
        description: "Chartered Engineers must be competent... to: A2 Engage in the creative and innovative development of engineering technology and continuous improvement systems. This could include an ability to: Establish the user and market needs for a product, process or system. Explore opportunities for the development and transfer of technology. Identify constraints and exploit opportunities for the development and transfer of technology. Promote new applications for existing technology. Secure the necessary intellectual property (IP) rights. Develop and evaluate continuous improvement systems.",
        keywords: "establish user needs, marketing needs, constraints, opportunities, technology transfer, promote new applications, secure IP, problem solving, innovative solutions, continuous improvement",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::B,
        code: "B1",
        title: "Identify potential projects and opportunities.",
        description: "Chartered Engineers must be competent... to: B1 Identify potential projects and opportunities. This could include an ability to: Explore the territory for new opportunities. Review the potential for enhancing engineering products, processes, systems and services. Use market intelligence and knowledge of technological development to contribute to the identification and exploration of new business opportunities. Contribute to evaluation of the technical and commercial viability of proposed projects. Make an effective technical contribution to proposals and tenders. Engage with stakeholders to identify engineering projects and opportunities.",
        keywords: "explore opportunities, review potential enhancements, feasibility studies, technical contributions, commercial viability, stakeholder engagement, market intelligence, business opportunities",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::B,
        code: "B2",
        title: "Conduct appropriate research, and undertake design and development of engineering solutions.",
        description: "Chartered Engineers must be competent... to: B2 Conduct appropriate research, and undertake design and development of engineering solutions. This could include an ability to: Identify and agree appropriate research methodologies. Assemble the necessary resources. Carry out the necessary tests. Collect, analyse and evaluate the relevant data. Develop theoretical concepts. Apply theoretical concepts to develop new technologies, products, processes, systems or services. Undertake engineering design. Manage the design process, develop, and evaluate alternative solutions and justify the option chosen. Take technical responsibility for a significant component of a complex engineering project. Solve non-standard engineering problems.",
        keywords: "research methodologies, assemble resources, carry out tests, collect data, analyse data, evaluate data, design solutions, manage design process, technical responsibility, non-standard problems, theoretical concepts",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::B,
        code: "B3",
        title: "Implement design solutions, and evaluate their effectiveness.",
        description: "Chartered Engineers must be competent... to: B3 Implement design solutions, and evaluate their effectiveness. This could include an ability to: Ensure that the application of the design results in the appropriate product, process, system or service. Implement solutions and contribute to their evaluation considering critical constraints including due concern for safety and sustainability. Identify areas of existing best practice. Critically evaluate the effectiveness of the design against original specifications and identify potential areas of improvement. Actively learn from feedback on performance to improve future design solutions and build best practice.",
        keywords: "ensure appropriate outcome, critical constraints, evaluate solutions, improve effectiveness, best practice, risk assessment, safety, sustainability, feedback, design specifications",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::C,
        code: "C1",
        title: "Plan for effective project implementation.",
        description: "Chartered Engineers must be competent... to: C1 Plan for effective project implementation. This could include an ability to: Identify the factors affecting projects, including health, safety, welfare, sustainability, environmental impact and quality considerations. Lead on preparing and agreeing implementation plans and method statements. Ensure that necessary resources are secured and build in contingency where needed. Understand and take account of the principal technical and commercial risks in a project. Demonstrate awareness of relevant legal and contractual issues. Develop and implement appropriate technical improvements and changes.",
        keywords: "identify projects, technical improvements, prepare specifications, user requirements, technical risk analysis, mitigation measures, emerging technologies, implementation plans, method statements, resource allocation, legal issues, contractual issues",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::C,
        code: "C2",
        title: "Plan, budget, organise, direct and control tasks, people and resources.",
        description: "Chartered Engineers must be competent... to: C2 Plan, budget, organise, direct and control tasks, people and resources. This could include an ability to: Set up and manage appropriate management systems. Agree quality standards, programme and budget. Organise and lead work teams, coordinating project activities. Ensure that proper account is taken of legal and contractual requirements applicable to a project. Manage and control the use of resources. Manage variations from specification effectively. Monitor progress and control costs effectively reporting on both as required.",
        keywords: "set up management systems, quality standards, programme, budget, legal requirements, organise work teams, coordinate project activities, manage variations, monitor progress, cost control, resource management",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::C,
        code: "C3",
        title: "Lead teams and develop staff to meet changing technical and managerial needs.",
        description: "Chartered Engineers must be competent... to: C3 Lead teams and develop staff to meet changing technical and managerial needs. This could include an ability to: Agree objectives and work plans with teams and individuals. Identify team and individual needs. Plan and lead the development of team members and individuals. Support and motivate team members and individuals. Assess team and individual performance and provide feedback. Carry out staff appraisals. Guide and support the learning and development of others (eg staff, colleagues, mentees).",
        keywords: "agree objectives, work plans, identify team needs, individual needs, plan development, lead development, support development, assess performance, provide feedback, staff appraisals, training, mentoring, team leadership",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::C,
        code: "C4",
        title: "Bring about continuous quality improvement.",
        description: "Chartered Engineers must be competent... to: C4 Bring about continuous quality improvement. This could include an ability to: Promote quality throughout the organisation and its customer and supplier networks. Develop and maintain operations to meet quality standards. Direct project and process evaluation and use learning points. Make recommendations for improvement and implement them. Implement and share the results of best practice.",
        keywords: "promote quality, develop operations, meet quality standards, direct project evaluation, recommendations for improvement, implement change, best practice, quality management",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::D,
        code: "D1",
        title: "Communicate in English with others at all levels.",
        description: "Chartered Engineers must be competent... to: D1 Communicate in English with others at all levels. This could include an ability to: Contribute effectively to meetings and discussions. Prepare and deliver clear presentations. Prepare and issue clear letters, documents and reports. Exchange information and provide advice to technical and non-technical colleagues. Deal effectively with difficult situations. Chair meetings effectively.",
        keywords: "contribute to meetings, chair meetings, record meetings, prepare letters, documents, reports, complex matters, exchange information, provide advice, technical colleagues, non-technical colleagues, clear presentations",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::D,
        code: "D2",
        title: "Present and discuss proposals.",
        description: "Chartered Engineers must be competent... to: D2 Present and discuss proposals. This could include an ability to: Prepare and deliver presentations on strategic matters. Lead and sustain debates with audiences. Be influential in meetings and discussions. Feed back information to improve proposals.",
        keywords: "prepare presentations, deliver presentations, strategic matters, lead debates, sustain debates, feedback, improve proposals, influential communication",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::D,
        code: "D3",
        title: "Demonstrate personal and social skills.",
        description: "Chartered Engineers must be competent... to: D3 Demonstrate personal and social skills. This could include an ability to: Know and manage own emotions, strengths and weaknesses. Be aware of the needs and concerns of others, especially where related to diversity and inclusion. Be confident and flexible in dealing with new and changing situations. Be confident and flexible in dealing with new and changing interpersonal situations. Identify, agree and lead work towards collective goals. Create, maintain and enhance productive working relationships and resolve conflicts. Demonstrate a commitment to equality, diversity and inclusion.",
        keywords: "manage own emotions, strengths, weaknesses, aware of others' needs, concerns, confident, flexible, new situations, changing situations, interpersonal situations, identify collective goals, agree collective goals, lead work towards collective goals, create productive relationships, maintain productive relationships, enhance productive relationships, resolve conflicts, diversity, anti-discrimination, equality, inclusion",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::E,
        code: "E1",
        title: "Comply with relevant codes of conduct.",
        description: "Chartered Engineers must be competent... to: E1 Comply with relevant codes of conduct. This could include an ability to: Understand and comply with the rules of professional conduct of their professional body. Understand and comply with the codes of conduct relevant to their jurisdiction. Manage engineering activities to promote sustainable development. Understand the environmental, health and safety regulations which govern their engineering activities.",
        keywords: "rules of professional conduct, professional body, codes relevant to jurisdiction, manage engineering activities, sustainable development, health and safety regulations, compliance",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::E,
        code: "E2",
        title: "Manage and apply safe systems of work.",
        description: "Chartered Engineers must be competent... to: E2 Manage and apply safe systems of work. This could include an ability to: Identify and take responsibility for their own obligations for health, safety and welfare issues. Ensure that systems satisfy health, safety and welfare requirements. Develop and implement appropriate hazard identification and risk management systems and procedures. Manage, evaluate and improve safety performance. Understand and encourage a culture of health and safety. Understand the requirements for working with hazardous materials and in hazardous environments.",
        keywords: "identify hazards, assess risks, manage risks, ensure systems satisfy requirements, develop procedures, implement procedures, safe systems, security, health and safety culture, risk management",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::E,
        code: "E3",
        title: "Undertake engineering activities in a way that contributes to sustainable development.",
        description: "Chartered Engineers must be competent... to: E3 Undertake engineering activities in a way that contributes to sustainable development. This could include an ability to: Operate and act responsibly, taking account of the need to progress environmental, social and economic outcomes simultaneously. Understand and secure stakeholder involvement in sustainable development. Use imagination, creativity and innovation to provide products and services which maintain and enhance the quality of the environment and community and meet financial objectives. Understand and encourage stakeholder involvement in sustainable development. Understand the implications of the United Nations Sustainable Development Goals for their area of work. Plan and undertake work to further the United Nations Sustainable Development Goals. Strive for energy efficiency and resource efficiency in their work.",
        keywords: "operate and act responsibly, minimise adverse impacts, social impact, economic impact, environmental impact, understand UN SDGs, energy efficiency, resource efficiency, stakeholder involvement, sustainable solutions",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::E,
        code: "E4",
        title: "Carry out continuing professional development (CPD) necessary to maintain and enhance competence in own area of practice.",
        description: "Chartered Engineers must be competent... to: E4 Carry out continuing professional development (CPD) necessary to maintain and enhance competence in own area of practice. This could include an ability to: Undertake reviews of own development needs. Plan how to meet personal and organisational objectives. Carry out planned and unplanned CPD activities. Maintain evidence of competence development. Evaluate CPD outcomes against action plans. Assist others with their own CPD. Engage with wider developments in the national and international engineering community.",
        keywords: "planned CPD, unplanned CPD, maintain evidence, competence development, evaluate CPD outcomes, action plans, assist others with CPD, national engineering issues, international engineering issues, maintain CPD plans, maintain CPD records, self-review",
    },
    ReferenceEntry {
        area: CompetencyAreaCode::E,
        code: "E5",
        title: "Exercise responsibilities in an ethical manner.",
        description: "Chartered Engineers must be competent... to: E5 Exercise responsibilities in an ethical manner. This could include an ability to: Understand the ethical issues that may arise in their role and carry out their responsibilities in an ethical manner. Identify and raise ethical concerns or dilemmas. Make and justify ethical judgements. Promote awareness and understanding of ethical issues. Uphold the ethical principles of their profession and act in the public interest.",
        keywords: "ethical principles, ethical dilemmas, make ethical judgments, justify decisions, social responsibility, public interest, raise ethical concerns, promote ethical awareness",
    },
];

fn area_title(code: CompetencyAreaCode) -> &'static str {
    AREA_TITLES
        .iter()
        .find(|(area, _)| *area == code)
        .map(|(_, title)| *title)
        .unwrap_or_default()
}

/// Build the reference catalog.
pub(crate) fn reference_catalog() -> CompetencyCatalog {
    let areas = AREA_TITLES
        .iter()
        .map(|(code, title)| CompetencyArea {
            code: *code,
            title: (*title).to_string(),
        })
        .collect();

    let entries = ENTRIES
        .iter()
        .map(|entry| SubCompetency {
            area_code: entry.area,
            area_title: area_title(entry.area).to_string(),
            code: entry.code.to_string(),
            title: entry.title.to_string(),
            full_description: entry.description.to_string(),
            keywords: entry
                .keywords
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
        })
        .collect();

    CompetencyCatalog::from_parts(areas, entries)
}
