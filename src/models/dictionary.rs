#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dictionary {
    EmploymentType,
    EducationLevel,
    Degree,
    Tag,
}

impl Dictionary {
    pub const ALL: [Dictionary; 4] = [
        Dictionary::EmploymentType,
        Dictionary::EducationLevel,
        Dictionary::Degree,
        Dictionary::Tag,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Dictionary::EmploymentType => "employment_types",
            Dictionary::EducationLevel => "education_levels",
            Dictionary::Degree => "degrees",
            Dictionary::Tag => "tags",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dictionary::EmploymentType => "employment type",
            Dictionary::EducationLevel => "education level",
            Dictionary::Degree => "degree",
            Dictionary::Tag => "tag",
        }
    }

    /// Seed entries in display order.
    pub fn seed(&self) -> &'static [&'static str] {
        match self {
            Dictionary::EmploymentType => &[
                "Повна зайнятість",
                "Часткова зайнятість",
                "Дистанційна робота",
                "Гібридний формат",
                "Проєктна робота / Freelance",
                "Стажування",
            ],
            Dictionary::EducationLevel => &[
                "Загальна середня",
                "Професійно-технічна",
                "Неповна вища",
                "Базова вища",
                "Вища освіта",
            ],
            Dictionary::Degree => &[
                "Кваліфікований робітник",
                "Молодший бакалавр",
                "Фаховий молодший бакалавр",
                "Молодший спеціаліст",
                "Бакалавр",
                "Спеціаліст",
                "Магістр",
                "Кандидат наук",
                "Доктор наук",
            ],
            Dictionary::Tag => &[
                "Державна служба",
                "Вакансія з житлом",
                "Для ветеранів",
                "Перша робота / Без досвіду",
                "Робота для студентів",
                "Для осіб з інвалідністю",
                "Бронювання працівників",
            ],
        }
    }
}

pub const DEFAULT_VACANCY_SOURCE_CODE: &str = "dsz";
pub const DEFAULT_VACANCY_SOURCE_NAME: &str = "Державна служба зайнятості";

