//! Built-in standard object catalog
//!
//! The objects every workspace gets, plus flag-gated ones.

use crate::definition::{DynamicFieldDefinition, StandardObjectDefinition, StaticFieldDefinition};
use wsync_metadata::{FeatureFlagKey, FieldOption, FieldType};

/// Full built-in catalog, in creation order
#[must_use]
pub fn standard_object_definitions() -> Vec<StandardObjectDefinition> {
    vec![
        workspace_member(),
        company(),
        person(),
        opportunity(),
        activity(),
        activity_target(),
        attachment(),
        favorite(),
        blocklist(),
        calendar_event(),
        message_thread(),
    ]
}

fn workspace_member() -> StandardObjectDefinition {
    StandardObjectDefinition::new(
        "workspaceMember",
        "workspaceMembers",
        "Workspace Member",
        "Workspace Members",
    )
    .description("A workspace member")
    .icon("IconUserCircle")
    .system()
    .field(StaticFieldDefinition::new("name", "Name", FieldType::FullName).icon("IconCircleUser"))
    .field(StaticFieldDefinition::new("userEmail", "User Email", FieldType::Email).icon("IconMail"))
    .field(
    StaticFieldDefinition::new("colorScheme", "Color Scheme", FieldType::Text)
        .icon("IconColorSwatch")
        .default_value(serde_json::json!("Light")),
    )
    .field(
    StaticFieldDefinition::new("locale", "Language", FieldType::Text)
        .icon("IconLanguage")
        .default_value(serde_json::json!("en")),
    )
    .field(
    StaticFieldDefinition::new("calendarStartDay", "Calendar start day", FieldType::Number)
        .default_value(serde_json::json!(0))
        .gated(FeatureFlagKey::IsCalendarEnabled),
    )
    .with_system_fields()
}

fn company() -> StandardObjectDefinition {
    StandardObjectDefinition::new("company", "companies", "Company", "Companies")
        .description("A company")
        .icon("IconBuildingSkyscraper")
        .field(
            StaticFieldDefinition::new("name", "Name", FieldType::Text)
                .description("The company name")
                .icon("IconBuildingSkyscraper"),
        )
        .field(
            StaticFieldDefinition::new("domainName", "Domain Name", FieldType::Link)
                .description("The company website URL")
                .icon("IconLink"),
        )
        .field(StaticFieldDefinition::new("address", "Address", FieldType::Text).icon("IconMap"))
        .field(
            StaticFieldDefinition::new("employees", "Employees", FieldType::Number)
                .description("Number of employees in the company")
                .icon("IconUsers"),
        )
        .field(
            StaticFieldDefinition::new(
                "annualRecurringRevenue",
                "ARR",
                FieldType::Currency,
            )
            .description("Annual Recurring Revenue")
            .icon("IconMoneybag"),
        )
        .field(
            StaticFieldDefinition::new("idealCustomerProfile", "ICP", FieldType::Boolean)
                .icon("IconTarget")
                .default_value(serde_json::json!(false)),
        )
        .field(StaticFieldDefinition::new("position", "Position", FieldType::Position).system())
        .field(StaticFieldDefinition::relation("accountOwner", "Account Owner", "workspaceMember"))
        .field(
            StaticFieldDefinition::new(
                "accountOwnerId",
                "Account Owner id (foreign key)",
                FieldType::Uuid,
            )
            .system(),
        )
        .with_system_fields()
}

fn person() -> StandardObjectDefinition {
    StandardObjectDefinition::new("person", "people", "Person", "People")
        .description("A person")
        .icon("IconUser")
        .field(StaticFieldDefinition::new("name", "Name", FieldType::FullName).icon("IconUser"))
        .field(StaticFieldDefinition::new("email", "Email", FieldType::Email).icon("IconMail"))
        .field(StaticFieldDefinition::new("phone", "Phone", FieldType::Phone).icon("IconPhone"))
        .field(StaticFieldDefinition::new("city", "City", FieldType::Text).icon("IconMap"))
        .field(
            StaticFieldDefinition::new("jobTitle", "Job Title", FieldType::Text)
                .icon("IconBriefcase"),
        )
        .field(StaticFieldDefinition::new("avatarUrl", "Avatar", FieldType::Link).system())
        .field(StaticFieldDefinition::new("position", "Position", FieldType::Position).system())
        .field(StaticFieldDefinition::relation("company", "Company", "company"))
        .field(
            StaticFieldDefinition::new("companyId", "Company id (foreign key)", FieldType::Uuid)
                .system(),
        )
        .field(
            StaticFieldDefinition::relation(
                "calendarEventParticipants",
                "Calendar Event Participants",
                "calendarEvent",
            )
            .gated(FeatureFlagKey::IsCalendarEnabled),
        )
        .with_system_fields()
}

fn opportunity() -> StandardObjectDefinition {
    StandardObjectDefinition::new("opportunity", "opportunities", "Opportunity", "Opportunities")
        .description("An opportunity")
        .icon("IconTargetArrow")
        .field(StaticFieldDefinition::new("name", "Name", FieldType::Text).icon("IconTargetArrow"))
        .field(
            StaticFieldDefinition::new("amount", "Amount", FieldType::Currency)
                .icon("IconCurrencyDollar"),
        )
        .field(
            StaticFieldDefinition::new("closeDate", "Close date", FieldType::DateTime)
                .icon("IconCalendarEvent"),
        )
        .field(
            StaticFieldDefinition::new("stage", "Stage", FieldType::Select)
                .icon("IconProgressCheck")
                .default_value(serde_json::json!("NEW"))
                .options(vec![
                    FieldOption::new("NEW", "New", 0),
                    FieldOption::new("SCREENING", "Screening", 1),
                    FieldOption::new("MEETING", "Meeting", 2),
                    FieldOption::new("PROPOSAL", "Proposal", 3),
                    FieldOption::new("CUSTOMER", "Customer", 4),
                ]),
        )
        .field(StaticFieldDefinition::new("position", "Position", FieldType::Position).system())
        .field(StaticFieldDefinition::relation("company", "Company", "company"))
        .field(
            StaticFieldDefinition::new("companyId", "Company id (foreign key)", FieldType::Uuid)
                .system(),
        )
        .field(StaticFieldDefinition::relation("pointOfContact", "Point of Contact", "person"))
        .field(
            StaticFieldDefinition::new(
                "pointOfContactId",
                "Point of Contact id (foreign key)",
                FieldType::Uuid,
            )
            .system(),
        )
        .with_system_fields()
}

fn activity() -> StandardObjectDefinition {
    StandardObjectDefinition::new("activity", "activities", "Activity", "Activities")
        .description("An activity")
        .icon("IconCheckbox")
        .system()
        .field(StaticFieldDefinition::new("title", "Title", FieldType::Text).icon("IconNotes"))
        .field(StaticFieldDefinition::new("body", "Body", FieldType::Text).icon("IconList"))
        .field(
            StaticFieldDefinition::new("type", "Type", FieldType::Text)
                .icon("IconCheckbox")
                .default_value(serde_json::json!("Note")),
        )
        .field(
            StaticFieldDefinition::new("dueAt", "Due Date", FieldType::DateTime)
                .icon("IconCalendarEvent"),
        )
        .field(
            StaticFieldDefinition::new("completedAt", "Completion Date", FieldType::DateTime)
                .icon("IconCheck"),
        )
        .field(StaticFieldDefinition::relation("assignee", "Assignee", "workspaceMember"))
        .field(
            StaticFieldDefinition::new("assigneeId", "Assignee id (foreign key)", FieldType::Uuid)
                .system(),
        )
        .with_system_fields()
}

fn activity_target() -> StandardObjectDefinition {
    StandardObjectDefinition::new(
        "activityTarget",
        "activityTargets",
        "Activity Target",
        "Activity Targets",
    )
    .description("An activity target")
    .icon("IconCheckbox")
    .system()
    .field(StaticFieldDefinition::relation("activity", "Activity", "activity"))
    .field(
    StaticFieldDefinition::new("activityId", "Activity id (foreign key)", FieldType::Uuid)
        .system(),
    )
    .field(StaticFieldDefinition::relation("person", "Person", "person"))
    .field(
    StaticFieldDefinition::new("personId", "Person id (foreign key)", FieldType::Uuid).system(),
    )
    .field(StaticFieldDefinition::relation("company", "Company", "company"))
    .field(
    StaticFieldDefinition::new("companyId", "Company id (foreign key)", FieldType::Uuid)
        .system(),
    )
    .per_custom_object(
    DynamicFieldDefinition::new("custom")
        .description("Activity target custom object")
        .icon("IconBuildingSkyscraper")
        .with_join_column(),
    )
    .with_system_fields()
}

fn attachment() -> StandardObjectDefinition {
    StandardObjectDefinition::new("attachment", "attachments", "Attachment", "Attachments")
        .description("An attachment")
        .icon("IconFileImport")
        .system()
        .field(StaticFieldDefinition::new("name", "Name", FieldType::Text).icon("IconFileUpload"))
        .field(
            StaticFieldDefinition::new("fullPath", "Full path", FieldType::Text).icon("IconLink"),
        )
        .field(StaticFieldDefinition::new("type", "Type", FieldType::Text).icon("IconList"))
        .field(StaticFieldDefinition::relation("author", "Author", "workspaceMember"))
        .field(
            StaticFieldDefinition::new("authorId", "Author id (foreign key)", FieldType::Uuid)
                .system(),
        )
        .field(StaticFieldDefinition::relation("activity", "Activity", "activity"))
        .field(
            StaticFieldDefinition::new("activityId", "Activity id (foreign key)", FieldType::Uuid)
                .system(),
        )
        .per_custom_object(
            DynamicFieldDefinition::new("custom")
                .description("Attachment custom object")
                .icon("IconBuildingSkyscraper")
                .with_join_column(),
        )
        .with_system_fields()
}

fn favorite() -> StandardObjectDefinition {
    StandardObjectDefinition::new("favorite", "favorites", "Favorite", "Favorites")
        .description("A favorite")
        .icon("IconHeart")
        .system()
        .field(
            StaticFieldDefinition::new("position", "Position", FieldType::Position)
                .icon("IconList"),
        )
        .field(
            StaticFieldDefinition::relation(
                "workspaceMember",
                "Workspace Member",
                "workspaceMember",
            ),
        )
        .field(
            StaticFieldDefinition::new(
                "workspaceMemberId",
                "Workspace Member id (foreign key)",
                FieldType::Uuid,
            )
            .system(),
        )
        .field(StaticFieldDefinition::relation("person", "Person", "person"))
        .field(
            StaticFieldDefinition::new("personId", "Person id (foreign key)", FieldType::Uuid)
                .system(),
        )
        .field(StaticFieldDefinition::relation("company", "Company", "company"))
        .field(
            StaticFieldDefinition::new("companyId", "Company id (foreign key)", FieldType::Uuid)
                .system(),
        )
        .per_custom_object(
            DynamicFieldDefinition::new("custom")
                .description("Favorite custom object")
                .icon("IconHeart")
                .with_join_column(),
        )
        .with_system_fields()
}

fn blocklist() -> StandardObjectDefinition {
    StandardObjectDefinition::new("blocklist", "blocklists", "Blocklist", "Blocklists")
        .description("Blocklist")
        .icon("IconForbid2")
        .system()
        .gated(FeatureFlagKey::IsBlocklistEnabled)
        .field(StaticFieldDefinition::new("handle", "Handle", FieldType::Text).icon("IconAt"))
        .field(StaticFieldDefinition::relation(
            "workspaceMember",
            "WorkspaceMember",
            "workspaceMember",
        ))
        .field(
            StaticFieldDefinition::new(
                "workspaceMemberId",
                "WorkspaceMember id (foreign key)",
                FieldType::Uuid,
            )
            .system(),
        )
        .with_system_fields()
}

fn calendar_event() -> StandardObjectDefinition {
    StandardObjectDefinition::new(
        "calendarEvent",
        "calendarEvents",
        "Calendar event",
        "Calendar events",
    )
    .description("Calendar events")
    .icon("IconCalendar")
    .system()
    .gated(FeatureFlagKey::IsCalendarEnabled)
    .field(StaticFieldDefinition::new("title", "Title", FieldType::Text).icon("IconH1"))
    .field(
        StaticFieldDefinition::new("isFullDay", "Is Full Day", FieldType::Boolean)
            .icon("Icon24Hours")
            .default_value(serde_json::json!(false)),
    )
    .field(
        StaticFieldDefinition::new("startsAt", "Start DateTime", FieldType::DateTime)
            .icon("IconCalendarClock"),
    )
    .field(
        StaticFieldDefinition::new("endsAt", "End DateTime", FieldType::DateTime)
            .icon("IconCalendarClock"),
    )
    .field(StaticFieldDefinition::new("location", "Location", FieldType::Text).icon("IconMapPin"))
    .with_system_fields()
}

fn message_thread() -> StandardObjectDefinition {
    StandardObjectDefinition::new(
        "messageThread",
        "messageThreads",
        "Message Thread",
        "Message Threads",
    )
    .description("Message Thread")
    .icon("IconMessage")
    .system()
    .gated(FeatureFlagKey::IsMessagingEnabled)
    .field(StaticFieldDefinition::new("subject", "Subject", FieldType::Text).icon("IconMessage"))
    .field(
        StaticFieldDefinition::new(
            "lastMessageReceivedAt",
            "Last message received at",
            FieldType::DateTime,
        )
        .icon("IconCalendarClock"),
    )
    .with_system_fields()
}
